//! Affilnet command-line pipeline
//!
//! Loads a corpus, counts institutions, builds the collaboration graph,
//! runs the analytics and writes the visualization documents.

use affilnet_common::config::{AppConfig, ObservabilityConfig};
use affilnet_common::corpus::load_corpus;
use affilnet_common::metrics;
use affilnet_graph::export::{hierarchical_edge_bundling, node_link, treemap, write_json, RenderStyle};
use affilnet_graph::{CollaborationGraphBuilder, GraphAnalytics, GraphQuery, NativeAnalytics};
use affilnet_institutions::{CorpusAggregator, LookupTables};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "affilnet", version, about = "Institution collaboration graphs from paper headers")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, env = "AFFILNET_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder of the corpus
    #[arg(long)]
    corpus_dir: Option<PathBuf>,

    /// Folder the JSON documents are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Institutions must appear in more papers than this
    #[arg(long)]
    threshold: Option<usize>,

    /// Only papers published this year
    #[arg(long)]
    year: Option<u16>,

    /// Build a directed graph
    #[arg(long)]
    directed: bool,

    /// Seed for community detection
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Command-line flags win over every configuration source
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.corpus_dir {
            config.corpus.dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = dir.clone();
        }
        if let Some(threshold) = self.threshold {
            config.graph.frequency_threshold = threshold;
        }
        if self.year.is_some() {
            config.graph.year = self.year;
        }
        if self.directed {
            config.graph.directed = true;
        }
        if self.seed.is_some() {
            config.analytics.seed = self.seed;
        }
    }
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn run(config: &AppConfig) -> affilnet_common::Result<()> {
    let overrides;
    let tables = match &config.resolver.tables_path {
        Some(path) => {
            overrides = LookupTables::with_overrides(path)?;
            &overrides
        }
        None => LookupTables::builtin(),
    };

    // 1. Corpus
    let corpus = load_corpus(&config.metadata_path(), &config.texts_path())?;
    if corpus.is_empty() {
        warn!(dir = %config.corpus.dir.display(), "Corpus has no papers");
    }

    // 2. Institution frequencies
    let aggregator = CorpusAggregator::new(tables, &config.parser);
    let (frequencies, report) = aggregator.frequency(&corpus);

    // 3. Collaboration graph
    let query = GraphQuery::from_config(&config.graph);
    let (graph, node_files) = CollaborationGraphBuilder::new(aggregator, query).build(&corpus, &frequencies);

    // 4. Analytics
    let analytics = NativeAnalytics::new(config.analytics.clone());
    let graph_report = analytics.analyze(&graph)?;

    // 5. Documents
    let export = &config.export;
    let out = &export.output_dir;
    write_json(&out.join(&export.node_link_file), &node_link(&graph, Some(&graph_report.partition)))?;
    write_json(&out.join(&export.heb_file), &hierarchical_edge_bundling(&graph))?;
    write_json(
        &out.join(&export.treemap_file),
        &treemap(&graph_report, config.analytics.cluster_min_size),
    )?;
    write_json(
        &out.join(&export.style_file),
        &RenderStyle::from_graph(&graph, Some(&graph_report.partition)),
    )?;

    info!(
        papers = corpus.len(),
        institutions = report.cleaned,
        mentions = report.total,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        tracked_nodes = node_files.len(),
        clusters = graph_report.clusters(config.analytics.cluster_min_size).len(),
        output = %out.display(),
        "Affilnet run complete"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(&path.to_string_lossy())?,
        None => AppConfig::load()?,
    };
    cli.apply(&mut config);

    init_tracing(&config.observability);
    info!("Starting Affilnet v{}", affilnet_common::VERSION);

    metrics::register_metrics();

    run(&config).map_err(|e| {
        tracing::error!(error = %e, code = ?e.code(), "Affilnet run failed");
        e
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "affilnet",
            "--corpus-dir",
            "neurips",
            "--threshold",
            "5",
            "--year",
            "2018",
            "--directed",
            "--seed",
            "3",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.corpus.dir, PathBuf::from("neurips"));
        assert_eq!(config.graph.frequency_threshold, 5);
        assert_eq!(config.graph.year, Some(2018));
        assert!(config.graph.directed);
        assert_eq!(config.analytics.seed, Some(3));
        assert_eq!(config.export.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let texts = dir.path().join("texts");
        std::fs::create_dir_all(&texts).unwrap();

        let mut metadata = String::new();
        for (i, lines) in [
            "Title\nJane\nMIT\njane@mit.edu\nJohn\nStanford University\njohn@stanford.edu\nAbstract\nBody",
            "Title\nA\nStanford\na@stanford.edu\nB\nMIT\nb@mit.edu\nAbstract",
            "Title\nC\nMIT\nc@mit.edu\nAbstract",
        ]
        .iter()
        .enumerate()
        {
            let name = format!("paper{}", i);
            metadata.push_str(&format!("{{\"pdf_name\": \"{}\", \"year\": 2017}}\n", name));
            std::fs::write(texts.join(format!("{}.txt", name)), lines).unwrap();
        }
        std::fs::write(dir.path().join("papers_data.jsons"), metadata).unwrap();

        let mut config = AppConfig::default();
        config.corpus.dir = dir.path().to_path_buf();
        config.export.output_dir = dir.path().join("out");
        config.graph.frequency_threshold = 1;
        config.analytics.seed = Some(1);
        config.analytics.cluster_min_size = 1;

        run(&config).unwrap();

        let node_link = std::fs::read_to_string(dir.path().join("out/institutions.json")).unwrap();
        assert!(node_link.contains("stanford university"));
        assert!(dir.path().join("out/institutions_heb.json").exists());
        assert!(dir.path().join("out/institutions_treemap.json").exists());
        assert!(dir.path().join("out/institutions_style.json").exists());
    }
}
