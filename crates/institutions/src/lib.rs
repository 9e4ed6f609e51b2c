//! Affilnet Institution Extraction
//!
//! Turns noisy paper header lines into canonical institution names:
//! - Token normalization of raw header lines
//! - Keyword-driven institution block parsing with location expansion
//! - Typo fixing, split fixing, alias mapping and noise deletion
//! - Corpus-wide frequency aggregation

pub mod aggregator;
pub mod normalizer;
pub mod parser;
pub mod resolver;
pub mod tables;

pub use aggregator::{CorpusAggregator, FrequencyReport, InstitutionFrequencyTable};
pub use normalizer::{normalize_line, NormalizedLine};
pub use parser::{HeaderScanner, InstitutionFragment, InstitutionParser};
pub use resolver::InstitutionResolver;
pub use tables::{LookupTables, TableOverrides};
