//! Configuration management for Affilnet
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with AFFILNET__)
//! - Configuration files (config/default.toml, config/<env>.toml, config/local.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Corpus location
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Header parser behaviour
    #[serde(default)]
    pub parser: ParserConfig,

    /// Name resolution tables
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Collaboration graph filters
    #[serde(default)]
    pub graph: GraphConfig,

    /// Community detection and centrality settings
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Output documents
    #[serde(default)]
    pub export: ExportConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Root folder of one conference dump
    #[serde(default = "default_corpus_dir")]
    pub dir: PathBuf,

    /// JSON-lines metadata file, relative to `dir`
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Folder holding extracted text per paper, relative to `dir`
    #[serde(default = "default_texts_dir")]
    pub texts_dir: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Only expand "san diego" when the line actually mentions it.
    /// Off by default to keep counts comparable with historic runs.
    #[serde(default)]
    pub strict_city_match: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Optional JSON file extending the builtin lookup tables
    pub tables_path: Option<PathBuf>,
}

/// How repeated single-institution papers affect the self-loop
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopMode {
    /// Every qualifying paper re-adds the loop with weight 1
    #[default]
    Reset,
    /// Every qualifying paper increments the loop weight
    Accumulate,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphConfig {
    /// Institutions must appear in strictly more papers than this
    #[serde(default = "default_frequency_threshold")]
    pub frequency_threshold: usize,

    /// Restrict the graph to papers published this year
    pub year: Option<u16>,

    /// Build a directed graph (reciprocal edges)
    #[serde(default)]
    pub directed: bool,

    /// Self-loop accumulation policy
    #[serde(default)]
    pub self_loops: SelfLoopMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// Clusters with this many members or fewer are left out of reports
    #[serde(default = "default_cluster_min_size")]
    pub cluster_min_size: usize,

    /// Seed for community detection (random when unset)
    pub seed: Option<u64>,

    /// Modularity resolution
    #[serde(default = "default_resolution")]
    pub resolution: f64,

    /// Katz attenuation factor
    #[serde(default = "default_katz_alpha")]
    pub katz_alpha: f64,

    /// Katz per-node bias
    #[serde(default = "default_katz_beta")]
    pub katz_beta: f64,

    /// Power iteration cap (eigenvector, HITS)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Eigenvector convergence tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// HITS convergence tolerance
    #[serde(default = "default_hits_tolerance")]
    pub hits_tolerance: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Directory all documents are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_node_link_file")]
    pub node_link_file: String,

    #[serde(default = "default_heb_file")]
    pub heb_file: String,

    #[serde(default = "default_treemap_file")]
    pub treemap_file: String,

    #[serde(default = "default_style_file")]
    pub style_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_corpus_dir() -> PathBuf { PathBuf::from("data") }
fn default_metadata_file() -> String { "papers_data.jsons".to_string() }
fn default_texts_dir() -> String { "texts".to_string() }
fn default_frequency_threshold() -> usize { crate::DEFAULT_FREQUENCY_THRESHOLD }
fn default_cluster_min_size() -> usize { 3 }
fn default_resolution() -> f64 { 1.0 }
fn default_katz_alpha() -> f64 { 0.1 }
fn default_katz_beta() -> f64 { 1.0 }
fn default_max_iterations() -> usize { 100 }
fn default_tolerance() -> f64 { 1e-6 }
fn default_hits_tolerance() -> f64 { 1e-8 }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_node_link_file() -> String { "institutions.json".to_string() }
fn default_heb_file() -> String { "institutions_heb.json".to_string() }
fn default_treemap_file() -> String { "institutions_treemap.json".to_string() }
fn default_style_file() -> String { "institutions_style.json".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: default_corpus_dir(),
            metadata_file: default_metadata_file(),
            texts_dir: default_texts_dir(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            frequency_threshold: default_frequency_threshold(),
            year: None,
            directed: false,
            self_loops: SelfLoopMode::default(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cluster_min_size: default_cluster_min_size(),
            seed: None,
            resolution: default_resolution(),
            katz_alpha: default_katz_alpha(),
            katz_beta: default_katz_beta(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            hits_tolerance: default_hits_tolerance(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            node_link_file: default_node_link_file(),
            heb_file: default_heb_file(),
            treemap_file: default_treemap_file(),
            style_file: default_style_file(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("AFFILNET_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("graph.frequency_threshold", default_frequency_threshold() as i64)?
            .set_default("analytics.cluster_min_size", default_cluster_min_size() as i64)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with AFFILNET__ prefix
            // e.g., AFFILNET__GRAPH__FREQUENCY_THRESHOLD=5
            .add_source(
                Environment::with_prefix("AFFILNET")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific configuration file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("AFFILNET")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Absolute path of the metadata file
    pub fn metadata_path(&self) -> PathBuf {
        self.corpus.dir.join(&self.corpus.metadata_file)
    }

    /// Absolute path of the extracted-text folder
    pub fn texts_path(&self) -> PathBuf {
        self.corpus.dir.join(&self.corpus.texts_dir)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            parser: ParserConfig::default(),
            resolver: ResolverConfig::default(),
            graph: GraphConfig::default(),
            analytics: AnalyticsConfig::default(),
            export: ExportConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.graph.frequency_threshold, 2);
        assert_eq!(config.graph.self_loops, SelfLoopMode::Reset);
        assert!(!config.parser.strict_city_match);
        assert_eq!(config.analytics.max_iterations, 100);
    }

    #[test]
    fn test_corpus_paths() {
        let config = AppConfig::default();
        assert_eq!(config.metadata_path(), PathBuf::from("data/papers_data.jsons"));
        assert_eq!(config.texts_path(), PathBuf::from("data/texts"));
    }

    #[test]
    fn test_from_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("affilnet.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[graph]\nfrequency_threshold = 7\ndirected = true\nself_loops = \"accumulate\"").unwrap();
        writeln!(file, "[analytics]\nseed = 42").unwrap();

        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.graph.frequency_threshold, 7);
        assert!(config.graph.directed);
        assert_eq!(config.graph.self_loops, SelfLoopMode::Accumulate);
        assert_eq!(config.analytics.seed, Some(42));
        assert_eq!(config.analytics.katz_alpha, 0.1);
    }
}
