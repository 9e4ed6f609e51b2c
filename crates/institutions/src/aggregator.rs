//! Corpus-wide institution aggregation
//!
//! Each paper is parsed and resolved independently on the rayon pool. The
//! per-paper institution sets are then folded into the frequency table by a
//! single writer, so the counts never depend on iteration order.

use crate::parser::InstitutionParser;
use crate::resolver::InstitutionResolver;
use crate::tables::LookupTables;
use affilnet_common::config::ParserConfig;
use affilnet_common::metrics::record_paper;
use affilnet_common::Corpus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Number of distinct papers mentioning each canonical institution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstitutionFrequencyTable {
    counts: HashMap<String, usize>,
}

impl InstitutionFrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one paper's deduplicated institutions
    pub fn record_paper(&mut self, institutions: &BTreeSet<String>) {
        for name in institutions {
            *self.counts.entry(name.clone()).or_insert(0) += 1;
        }
    }

    /// Paper count of an institution, 0 when unseen
    pub fn get(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Institutions seen in strictly more than `threshold` papers
    pub fn filtered(&self, threshold: usize) -> HashSet<String> {
        self.counts
            .iter()
            .filter(|(name, &count)| !name.is_empty() && count > threshold)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of distinct institutions
    pub fn distinct(&self) -> usize {
        self.counts
            .iter()
            .filter(|(name, &count)| !name.is_empty() && count > 0)
            .count()
    }

    /// Sum of per-paper mentions
    pub fn total_mentions(&self) -> usize {
        self.counts
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(_, &count)| count)
            .sum()
    }

    /// `1 - distinct / total`, 0 for an empty table
    pub fn cleanup_ratio(&self) -> f64 {
        let total = self.total_mentions();
        if total == 0 {
            return 0.0;
        }
        1.0 - self.distinct() as f64 / total as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, &count)| (name.as_str(), count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Diagnostics for the table as it stands
    pub fn report(&self) -> FrequencyReport {
        FrequencyReport {
            cleaned: self.distinct(),
            total: self.total_mentions(),
            cleanup_ratio: self.cleanup_ratio(),
        }
    }
}

impl FromIterator<(String, usize)> for InstitutionFrequencyTable {
    fn from_iter<T: IntoIterator<Item = (String, usize)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Informational cleanup diagnostics, never gating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyReport {
    /// Distinct canonical institutions
    pub cleaned: usize,

    /// Total per-paper mentions
    pub total: usize,

    /// `1 - cleaned / total`
    pub cleanup_ratio: f64,
}

/// Resolution outcome for one header
struct PaperResolution {
    names: Vec<String>,
    dropped: usize,
}

/// Runs the parser and resolver over papers
#[derive(Debug, Clone, Copy)]
pub struct CorpusAggregator<'a> {
    parser: InstitutionParser<'a>,
    resolver: InstitutionResolver<'a>,
}

impl<'a> CorpusAggregator<'a> {
    pub fn new(tables: &'a LookupTables, config: &ParserConfig) -> Self {
        Self {
            parser: InstitutionParser::new(tables, config),
            resolver: InstitutionResolver::new(tables),
        }
    }

    /// Aggregator over the builtin tables with default options
    pub fn builtin() -> CorpusAggregator<'static> {
        CorpusAggregator::new(LookupTables::builtin(), &ParserConfig::default())
    }

    pub fn parser(&self) -> &InstitutionParser<'a> {
        &self.parser
    }

    pub fn resolver(&self) -> &InstitutionResolver<'a> {
        &self.resolver
    }

    fn resolve_header<S: AsRef<str>>(&self, header: &[S]) -> PaperResolution {
        let mut names = Vec::new();
        let mut dropped = 0;

        for block in self.parser.parse(header) {
            let Some(raw_name) = block.raw_name() else {
                continue;
            };
            for resolved in self.resolver.resolve_all(raw_name) {
                match resolved {
                    Some(name) if !name.is_empty() => names.push(name),
                    _ => dropped += 1,
                }
            }
        }

        PaperResolution { names, dropped }
    }

    /// Canonical institutions of one paper, in header order, duplicates kept.
    ///
    /// With an allow-list only its members are returned; an empty allow-list
    /// therefore returns nothing.
    pub fn paper_institutions<S: AsRef<str>>(
        &self,
        header: &[S],
        allow: Option<&HashSet<String>>,
    ) -> Vec<String> {
        let names = self.resolve_header(header).names;
        match allow {
            Some(allow) => names.into_iter().filter(|name| allow.contains(name)).collect(),
            None => names,
        }
    }

    /// Deduplicated canonical institutions of one paper
    pub fn unique_paper_institutions<S: AsRef<str>>(
        &self,
        header: &[S],
        allow: Option<&HashSet<String>>,
    ) -> BTreeSet<String> {
        self.paper_institutions(header, allow).into_iter().collect()
    }

    /// Frequency table over every paper of the corpus
    pub fn frequency(&self, corpus: &Corpus) -> (InstitutionFrequencyTable, FrequencyReport) {
        let headers: Vec<&[String]> = corpus.headers.values().map(Vec::as_slice).collect();
        self.frequency_of_headers(&headers)
    }

    /// Frequency table over a set of headers
    pub fn frequency_of_headers(
        &self,
        headers: &[&[String]],
    ) -> (InstitutionFrequencyTable, FrequencyReport) {
        let per_paper: Vec<(BTreeSet<String>, usize, usize)> = headers
            .par_iter()
            .map(|header| {
                let resolution = self.resolve_header(*header);
                let mentions = resolution.names.len();
                let unique: BTreeSet<String> = resolution.names.into_iter().collect();
                (unique, mentions, resolution.dropped)
            })
            .collect();

        let mut table = InstitutionFrequencyTable::new();
        for (unique, mentions, dropped) in &per_paper {
            table.record_paper(unique);
            record_paper(*mentions, *dropped);
        }

        let report = table.report();
        debug!(papers = headers.len(), "Aggregated institution frequencies");
        info!(
            cleaned = report.cleaned,
            total = report.total,
            cleanup_ratio = report.cleanup_ratio,
            "Institution frequency table built"
        );

        (table, report)
    }
}
