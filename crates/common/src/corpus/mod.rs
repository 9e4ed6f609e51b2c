//! Corpus model
//!
//! A corpus is the set of papers of one conference dump: per paper the
//! header lines (everything before the abstract) and the metadata record.

mod header;
mod loader;

pub use header::extract_header;
pub use loader::load_corpus;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Paper identifier (the `pdf_name` of the metadata record)
pub type PaperId = String;

/// Metadata record for one paper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    /// File name of the paper, used as its identifier
    pub pdf_name: PaperId,

    /// Publication year
    #[serde(default)]
    pub year: Option<u16>,

    /// Paper title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Any other crawler fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PaperMetadata {
    pub fn new(pdf_name: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            pdf_name: pdf_name.into(),
            year,
            ..Default::default()
        }
    }
}

/// In-memory corpus: header lines and metadata keyed by paper id
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Header lines per paper
    pub headers: BTreeMap<PaperId, Vec<String>>,

    /// Metadata per paper (may be missing for some papers)
    pub metadata: HashMap<PaperId, PaperMetadata>,
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paper's header and optional metadata
    pub fn insert_paper(
        &mut self,
        id: impl Into<PaperId>,
        header: Vec<String>,
        metadata: Option<PaperMetadata>,
    ) {
        let id = id.into();
        if let Some(metadata) = metadata {
            self.metadata.insert(id.clone(), metadata);
        }
        self.headers.insert(id, header);
    }

    /// Number of papers with a header
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Paper ids in stable order
    pub fn paper_ids(&self) -> impl Iterator<Item = &PaperId> {
        self.headers.keys()
    }

    /// Header lines of one paper
    pub fn header(&self, id: &str) -> Option<&[String]> {
        self.headers.get(id).map(|v| v.as_slice())
    }

    /// Papers grouped by publication year. Papers without a year are absent.
    pub fn year_index(&self) -> HashMap<u16, HashSet<PaperId>> {
        let mut index: HashMap<u16, HashSet<PaperId>> = HashMap::new();
        for (id, metadata) in &self.metadata {
            if let Some(year) = metadata.year {
                index.entry(year).or_default().insert(id.clone());
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_index_skips_missing_years() {
        let mut corpus = Corpus::new();
        corpus.insert_paper("a.pdf", vec![], Some(PaperMetadata::new("a.pdf", Some(2017))));
        corpus.insert_paper("b.pdf", vec![], Some(PaperMetadata::new("b.pdf", None)));
        corpus.insert_paper("c.pdf", vec![], None);

        let index = corpus.year_index();
        assert_eq!(index.len(), 1);
        assert!(index[&2017].contains("a.pdf"));
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn test_metadata_keeps_extra_fields() {
        let raw = r#"{"pdf_name": "x.pdf", "year": 2019, "title": "T", "authors": ["A"]}"#;
        let metadata: PaperMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(metadata.year, Some(2019));
        assert_eq!(metadata.title.as_deref(), Some("T"));
        assert!(metadata.extra.contains_key("authors"));
    }
}
