//! Affilnet Common Library
//!
//! Shared code for all Affilnet crates including:
//! - Error types and handling
//! - Configuration management
//! - Corpus model, loading and header segmentation
//! - Metrics and observability

pub mod config;
pub mod corpus;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use corpus::{Corpus, PaperId, PaperMetadata};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default institution frequency threshold (strictly greater-than)
pub const DEFAULT_FREQUENCY_THRESHOLD: usize = 2;
