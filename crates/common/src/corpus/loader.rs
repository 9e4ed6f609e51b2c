//! Corpus folder loading
//!
//! Expected layout:
//!
//! ```text
//! <dir>/papers_data.jsons      one JSON metadata object per line
//! <dir>/texts/<pdf_name>.txt   extracted text, one visual line per line
//! ```

use super::{extract_header, Corpus, PaperMetadata};
use crate::errors::{AppError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const TEXT_EXTENSION: &str = ".txt";

/// Load metadata and extracted headers for a corpus folder
pub fn load_corpus(metadata_path: &Path, texts_dir: &Path) -> Result<Corpus> {
    let mut metadata = load_metadata(metadata_path)?;
    let mut corpus = Corpus::new();

    let entries = fs::read_dir(texts_dir).map_err(|e| AppError::Corpus {
        path: texts_dir.display().to_string(),
        message: format!("Failed to list texts: {}", e),
    })?;

    for entry in entries {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(paper_id) = file_name.strip_suffix(TEXT_EXTENSION) else {
            continue;
        };

        let bytes = fs::read(&path).map_err(|e| AppError::Corpus {
            path: path.display().to_string(),
            message: format!("Failed to read text: {}", e),
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = text
            .lines()
            .filter(|line| !line.is_empty() && !line.contains('\0'))
            .collect();
        let header = extract_header(&lines);

        debug!(paper = paper_id, header_lines = header.len(), "Loaded paper text");
        let paper_metadata = metadata.remove(paper_id);
        corpus.insert_paper(paper_id, header, paper_metadata);
    }

    for missing in metadata.keys() {
        warn!(paper = %missing, "Metadata entry without extracted text, skipping");
    }

    info!(
        papers = corpus.len(),
        with_metadata = corpus.metadata.len(),
        "Corpus loaded"
    );

    Ok(corpus)
}

/// Parse the JSON-lines metadata file into a map keyed by `pdf_name`
fn load_metadata(path: &Path) -> Result<HashMap<String, PaperMetadata>> {
    let raw = fs::read_to_string(path).map_err(|e| AppError::Corpus {
        path: path.display().to_string(),
        message: format!("Failed to read metadata: {}", e),
    })?;

    let mut metadata = HashMap::new();
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: PaperMetadata =
            serde_json::from_str(line).map_err(|e| AppError::InvalidMetadata {
                message: format!("{} line {}: {}", path.display(), number + 1, e),
            })?;
        metadata.insert(record.pdf_name.clone(), record);
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn write(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let texts = dir.path().join("texts");
        fs::create_dir(&texts).unwrap();

        write(
            &dir.path().join("papers_data.jsons"),
            "{\"pdf_name\": \"a.pdf\", \"year\": 2018}\n\n{\"pdf_name\": \"gone.pdf\", \"year\": 2018}\n",
        );
        write(
            &texts.join("a.pdf.txt"),
            "Deep Things\nJane Doe\n\nStanford University\nAbstract\nBody text\n",
        );
        write(&texts.join("b.pdf.txt"), "Other\nMIT\n");
        write(&texts.join("notes.md"), "ignored");

        let corpus = load_corpus(&dir.path().join("papers_data.jsons"), &texts).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(
            corpus.header("a.pdf").unwrap(),
            &["Deep Things", "Jane Doe", "Stanford University"]
        );
        assert_eq!(corpus.metadata["a.pdf"].year, Some(2018));
        assert!(!corpus.metadata.contains_key("b.pdf"));
        assert!(!corpus.headers.contains_key("gone.pdf"));
    }

    #[test]
    fn test_malformed_metadata_line() {
        let dir = tempfile::tempdir().unwrap();
        let texts = dir.path().join("texts");
        fs::create_dir(&texts).unwrap();
        write(&dir.path().join("papers_data.jsons"), "{\"pdf_name\": \"a.pdf\"}\nnot json\n");

        let err = load_corpus(&dir.path().join("papers_data.jsons"), &texts).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidMetadata);
        assert!(err.to_string().contains("papers_data.jsons line 2"));
    }

    #[test]
    fn test_latin1_text_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let texts = dir.path().join("texts");
        fs::create_dir(&texts).unwrap();
        write(
            &dir.path().join("papers_data.jsons"),
            "{\"pdf_name\": \"a.pdf\", \"year\": 2018}\n{\"pdf_name\": \"b.pdf\", \"year\": 2018}\n",
        );
        write(&texts.join("a.pdf.txt"), "Title\nMIT\nAbstract\n");
        fs::write(
            texts.join("b.pdf.txt"),
            b"Title\n\xC9cole Polytechnique\nAbstract\n".as_slice(),
        )
        .unwrap();

        let corpus = load_corpus(&dir.path().join("papers_data.jsons"), &texts).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.header("a.pdf").unwrap(), &["Title", "MIT"]);
        let header = corpus.header("b.pdf").unwrap();
        assert_eq!(header.len(), 2);
        assert_eq!(header[1], "\u{FFFD}cole Polytechnique");
    }

    #[test]
    fn test_missing_texts_dir_names_path() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("papers_data.jsons"), "");

        let err = load_corpus(&dir.path().join("papers_data.jsons"), &dir.path().join("absent"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CorpusError);
        assert!(err.to_string().contains("absent"));
    }
}
