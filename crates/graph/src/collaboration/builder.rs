//! Graph construction from a resolved corpus

use super::{CollaborationGraph, GraphQuery, NodeFileIndex};
use affilnet_common::metrics::record_edges;
use affilnet_common::{Corpus, PaperId};
use affilnet_institutions::{CorpusAggregator, InstitutionFrequencyTable};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Builds one collaboration graph per query
#[derive(Debug, Clone)]
pub struct CollaborationGraphBuilder<'a> {
    aggregator: CorpusAggregator<'a>,
    query: GraphQuery,
}

impl<'a> CollaborationGraphBuilder<'a> {
    pub fn new(aggregator: CorpusAggregator<'a>, query: GraphQuery) -> Self {
        Self { aggregator, query }
    }

    pub fn query(&self) -> &GraphQuery {
        &self.query
    }

    /// Papers passing the year and id filters, in corpus order
    fn selected_papers<'c>(&self, corpus: &'c Corpus) -> Vec<(&'c PaperId, &'c [String])> {
        let year_papers: Option<HashSet<PaperId>> = self
            .query
            .year
            .map(|year| corpus.year_index().remove(&year).unwrap_or_default());

        corpus
            .headers
            .iter()
            .filter(|(id, _)| match &year_papers {
                Some(papers) => papers.contains(*id),
                None => true,
            })
            .filter(|(id, _)| match &self.query.paper_ids {
                Some(ids) => ids.contains(*id),
                None => true,
            })
            .map(|(id, header)| (id, header.as_slice()))
            .collect()
    }

    /// Build the graph and its provenance index
    pub fn build(
        &self,
        corpus: &Corpus,
        frequencies: &InstitutionFrequencyTable,
    ) -> (CollaborationGraph, NodeFileIndex) {
        let filtered = frequencies.filtered(self.query.frequency_threshold);
        let papers = self.selected_papers(corpus);

        let per_paper: Vec<(&PaperId, BTreeSet<String>)> = papers
            .par_iter()
            .map(|(id, header)| {
                let institutions = self
                    .aggregator
                    .unique_paper_institutions(*header, Some(&filtered));
                (*id, institutions)
            })
            .collect();

        let mut graph = CollaborationGraph::new(self.query.directed);
        let mut node_files = NodeFileIndex::new();
        let mut additions = 0;

        for (id, institutions) in per_paper {
            let names: Vec<&String> = institutions.iter().collect();
            match names.len() {
                0 => continue,
                1 => {
                    graph.add_self_loop(names[0], self.query.self_loops);
                    node_files.entry(names[0].clone()).or_default().insert(id.clone());
                    additions += 1;
                }
                _ => {
                    for (i, a) in names.iter().enumerate() {
                        for b in &names[i + 1..] {
                            additions += graph.increment(a, b);
                        }
                        node_files.entry((*a).clone()).or_default().insert(id.clone());
                    }
                }
            }
        }

        record_edges(self.query.directed, additions);
        debug!(papers = papers.len(), institutions = filtered.len(), "Collaboration graph inputs");
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            directed = graph.is_directed(),
            threshold = self.query.frequency_threshold,
            year = ?self.query.year,
            "Collaboration graph built"
        );

        (graph, node_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affilnet_common::config::SelfLoopMode;
    use affilnet_common::PaperMetadata;

    fn paper(corpus: &mut Corpus, id: &str, year: Option<u16>, lines: &[&str]) {
        let header = lines.iter().map(|l| l.to_string()).collect();
        corpus.insert_paper(id, header, Some(PaperMetadata::new(id, year)));
    }

    /// Three mit+stanford papers, one mit-only, one google+mit, one stanford-only
    fn sample_corpus() -> Corpus {
        let mut corpus = Corpus::new();
        paper(&mut corpus, "p1.pdf", Some(2016), &["A", "Stanford University", "a@s.edu", "B", "MIT", "b@m.edu"]);
        paper(&mut corpus, "p2.pdf", Some(2017), &["A", "MIT", "a@m.edu", "B", "Stanford", "b@s.edu"]);
        paper(&mut corpus, "p3.pdf", Some(2017), &["A", "MIT", "a@m.edu", "B", "Stanford University", "b@s.edu"]);
        paper(&mut corpus, "p4.pdf", Some(2017), &["A", "MIT", "a@m.edu"]);
        paper(&mut corpus, "p5.pdf", Some(2016), &["A", "Google Research", "a@g.com", "B", "MIT", "b@m.edu"]);
        corpus.insert_paper(
            "p6.pdf",
            ["A", "Stanford University", "a@s.edu"].iter().map(|l| l.to_string()).collect(),
            None,
        );
        corpus
    }

    fn build(corpus: &Corpus, query: GraphQuery) -> (CollaborationGraph, NodeFileIndex) {
        let aggregator = CorpusAggregator::builtin();
        let (table, _) = aggregator.frequency(corpus);
        CollaborationGraphBuilder::new(aggregator, query).build(corpus, &table)
    }

    #[test]
    fn test_edge_weight_counts_shared_papers() {
        let corpus = sample_corpus();
        let (graph, _) = build(&corpus, GraphQuery::default().with_threshold(0));

        assert_eq!(graph.weight("mit", "stanford university"), Some(3));
        assert_eq!(graph.weight("stanford university", "mit"), Some(3));
        assert_eq!(graph.weight("google", "mit"), Some(1));
        assert_eq!(graph.weight("mit", "mit"), Some(1));
        assert_eq!(graph.weight("stanford university", "stanford university"), Some(1));
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_two_papers_share_two_institutions() {
        let mut corpus = Corpus::new();
        paper(&mut corpus, "x.pdf", None, &["A", "MIT", "a@m.edu", "B", "Stanford", "b@s.edu"]);
        paper(&mut corpus, "y.pdf", None, &["A", "Stanford University", "a@s.edu", "B", "MIT", "b@m.edu"]);

        let (graph, files) = build(&corpus, GraphQuery::default().with_threshold(0));
        assert_eq!(graph.weight("mit", "stanford university"), Some(2));
        assert_eq!(files["mit"].len(), 2);
    }

    #[test]
    fn test_threshold_excludes_rare_institutions() {
        let corpus = sample_corpus();
        let (graph, files) = build(&corpus, GraphQuery::default().with_threshold(2));

        // google is named by a single paper
        assert!(!graph.contains("google"));
        assert!(!files.contains_key("google"));
        // stanford: 4 papers, mit: 5 papers
        assert!(graph.contains("mit"));
        assert!(graph.contains("stanford university"));
    }

    #[test]
    fn test_undirected_weights_are_symmetric() {
        let corpus = sample_corpus();
        let (graph, _) = build(&corpus, GraphQuery::default().with_threshold(0));
        for (a, b, w) in graph.edges() {
            assert_eq!(graph.weight(b, a), Some(w));
        }
    }

    #[test]
    fn test_directed_build_keeps_reciprocal_edges() {
        let corpus = sample_corpus();
        let (graph, _) = build(&corpus, GraphQuery::default().with_threshold(0).directed(true));

        assert!(graph.is_directed());
        assert_eq!(graph.weight("mit", "stanford university"), Some(3));
        assert_eq!(graph.weight("stanford university", "mit"), Some(3));
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn test_self_loop_accumulate() {
        let corpus = sample_corpus();
        let (graph, files) = build(
            &corpus,
            GraphQuery::default()
                .with_threshold(0)
                .with_self_loops(SelfLoopMode::Accumulate),
        );
        assert_eq!(graph.weight("stanford university", "stanford university"), Some(1));
        assert_eq!(graph.weight("mit", "mit"), Some(1));
        assert!(files["mit"].contains("p4.pdf"));

        let mut corpus = corpus;
        paper(&mut corpus, "p7.pdf", None, &["A", "MIT", "a@m.edu"]);
        let (graph, _) = build(
            &corpus,
            GraphQuery::default()
                .with_threshold(0)
                .with_self_loops(SelfLoopMode::Accumulate),
        );
        assert_eq!(graph.weight("mit", "mit"), Some(2));
    }

    #[test]
    fn test_year_filter_skips_missing_metadata() {
        let corpus = sample_corpus();
        let (graph, files) = build(&corpus, GraphQuery::default().with_threshold(0).with_year(2017));

        assert_eq!(graph.weight("mit", "stanford university"), Some(2));
        assert!(!graph.contains("google"));
        // p6 has no metadata and never matches a year
        assert!(!files["stanford university"].contains("p6.pdf"));
    }

    #[test]
    fn test_paper_id_filter() {
        let corpus = sample_corpus();
        let ids: HashSet<PaperId> = ["p1.pdf".to_string(), "p5.pdf".to_string()].into_iter().collect();
        let (graph, files) = build(&corpus, GraphQuery::default().with_threshold(0).with_papers(ids));

        assert_eq!(graph.weight("mit", "stanford university"), Some(1));
        assert_eq!(graph.weight("google", "mit"), Some(1));
        assert_eq!(graph.weight("mit", "mit"), None);
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_empty_corpus() {
        let (graph, files) = build(&Corpus::new(), GraphQuery::default());
        assert_eq!(graph.node_count(), 0);
        assert!(files.is_empty());
    }
}
