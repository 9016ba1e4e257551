//! Persistence of generated pages.
//!
//! Pages are written to `<output_dir>/<sanitized question>.md`. Distinct
//! questions that sanitize to the same name overwrite each other.

use crate::error::{RagError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// First line of every saved page.
pub const ANSWER_HEADER: &str = "# Wikipedia page";

/// Extension of saved pages.
pub const ANSWER_EXTENSION: &str = "md";

/// Derive a file name from a question.
///
/// Every character that is not alphanumeric, a space, `-` or `_` becomes `_`.
pub fn sanitize_filename(question: &str) -> String {
    let stem: String = question
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.{}", stem, ANSWER_EXTENSION)
}

/// Path a page for `question` is saved to.
pub fn answer_path(output_dir: &Path, question: &str) -> PathBuf {
    output_dir.join(sanitize_filename(question))
}

/// Write a page under `output_dir`, creating the directory if needed.
///
/// An existing file with the same derived name is overwritten.
pub fn save_answer(output_dir: &Path, question: &str, content: &str) -> Result<PathBuf> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir).map_err(|e| RagError::io(output_dir, e))?;
    }

    let path = answer_path(output_dir, question);
    let data = format!("{}\n{}", ANSWER_HEADER, content);
    fs::write(&path, data).map_err(|e| RagError::io(&path, e))?;

    info!(path = %path.display(), "saved page");
    Ok(path)
}

/// Check if a page file exists at the given path.
pub fn answer_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}
