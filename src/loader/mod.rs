//! Document loading from a flat directory.
//!
//! Files are dispatched on extension to a format parser. Unknown formats
//! are skipped with a warning rather than failing the load.

mod html;
mod pdf;

pub use html::parse_html;
pub use pdf::parse_pdf;

use crate::document::Document;
use crate::error::{RagError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Page-oriented binary format, one document per page.
    Pdf,
    /// Markup format, one document per file.
    Html,
}

impl DocumentFormat {
    /// Determine format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "html" | "htm" => Some(DocumentFormat::Html),
            _ => None,
        }
    }

    /// Parse a file of this format into documents.
    pub fn parse(self, path: &Path) -> Result<Vec<Document>> {
        match self {
            DocumentFormat::Pdf => parse_pdf(path),
            DocumentFormat::Html => {
                let markup = std::fs::read_to_string(path).map_err(|e| RagError::io(path, e))?;
                Ok(vec![parse_html(&markup, path)])
            }
        }
    }
}

/// Documents loaded from a directory plus the files that were skipped.
#[derive(Debug, Default)]
pub struct LoadedCorpus {
    pub documents: Vec<Document>,
    /// Files with an unsupported extension, one entry per file.
    pub skipped: Vec<PathBuf>,
}

impl LoadedCorpus {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Load every supported file directly inside `dir` (no recursion).
///
/// Files are visited in file-name order. Subdirectories are ignored.
pub fn load_documents(dir: &Path) -> Result<LoadedCorpus> {
    if !dir.is_dir() {
        return Err(RagError::InvalidInputDir(dir.to_path_buf()));
    }

    let mut corpus = LoadedCorpus::default();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| RagError::io(dir, e.into()))?;
        let path = entry.path();

        if !path.is_file() {
            debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }

        match DocumentFormat::from_path(path) {
            Some(format) => {
                let documents = format.parse(path)?;
                debug!(path = %path.display(), ?format, count = documents.len(), "parsed file");
                corpus.documents.extend(documents);
            }
            None => {
                let name = entry.file_name().to_string_lossy();
                warn!("Unsupported format: {}", name);
                corpus.skipped.push(path.to_path_buf());
            }
        }
    }

    info!(
        dir = %dir.display(),
        documents = corpus.documents.len(),
        skipped = corpus.skipped.len(),
        "loaded documents"
    );

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PAGE: &str = "<html><head><style>p { color: red; }</style></head>\
        <body><h1>Ferritin</h1><p>Ferritin is a protein.</p><script>var x = 1;</script></body></html>";

    #[test]
    fn test_format_detection() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.pdf")), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_path(Path::new("a.PDF")), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_path(Path::new("a.html")), Some(DocumentFormat::Html));
        assert_eq!(DocumentFormat::from_path(Path::new("a.htm")), Some(DocumentFormat::Html));
        assert_eq!(DocumentFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let result = load_documents(Path::new("/nonexistent/input"));
        assert!(matches!(result, Err(RagError::InvalidInputDir(_))));
    }

    #[test]
    fn test_file_instead_of_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("page.html");
        fs::write(&file, PAGE).unwrap();
        assert!(matches!(load_documents(&file), Err(RagError::InvalidInputDir(_))));
    }

    #[test]
    fn test_unknown_formats_are_skipped_once_each() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.html"), PAGE).unwrap();
        fs::write(dir.path().join("b.html"), PAGE).unwrap();
        fs::write(dir.path().join("notes.txt"), "plain").unwrap();
        fs::write(dir.path().join("data.csv"), "a,b").unwrap();

        let corpus = load_documents(dir.path()).unwrap();
        assert_eq!(corpus.documents.len(), 2);
        assert_eq!(corpus.skipped.len(), 2);
        assert!(corpus.skipped[0].ends_with("data.csv"));
        assert!(corpus.skipped[1].ends_with("notes.txt"));
    }

    #[test]
    fn test_subdirectories_are_not_recursed() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("inner.html"), PAGE).unwrap();
        fs::write(dir.path().join("outer.html"), PAGE).unwrap();

        let corpus = load_documents(dir.path()).unwrap();
        assert_eq!(corpus.documents.len(), 1);
        assert!(corpus.documents[0].source().ends_with("outer.html"));
        assert!(corpus.skipped.is_empty());
    }

    #[test]
    fn test_mixed_pdf_and_html_counts() {
        let dir = TempDir::new().unwrap();
        pdf::write_test_pdf(&dir.path().join("a.pdf"), &["first page", "second page", "third page"]);
        fs::write(dir.path().join("b.html"), PAGE).unwrap();
        fs::write(dir.path().join("c.txt"), "plain").unwrap();

        let corpus = load_documents(dir.path()).unwrap();

        assert_eq!(corpus.documents.len(), 4);
        let pages: Vec<Option<usize>> = corpus.documents.iter().map(|d| d.page()).collect();
        assert_eq!(pages, vec![Some(0), Some(1), Some(2), None]);
        assert!(corpus.documents[3].source().ends_with("b.html"));
        assert_eq!(corpus.skipped.len(), 1);
    }

    #[test]
    fn test_corrupt_pdf_aborts_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not a pdf").unwrap();
        let result = load_documents(dir.path());
        assert!(matches!(result, Err(RagError::Load { .. })));
    }
}
