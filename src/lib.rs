//! Offline analyzers for Markdown skill documents.
//!
//! Each analyzer is a pure function from one document to a serializable
//! report: [`voice::analyze`] rates brand voice, [`seo::analyze`] scores
//! keyword placement and structure, and [`sprint::analyze`] summarizes a
//! sprint history. [`report::render`] turns any of them into text or JSON.

use std::path::Path;

pub mod bands;
pub mod error;
pub mod keywords;
pub mod readability;
pub mod report;
pub mod seo;
pub mod sprint;
pub mod text;
pub mod voice;

pub use error::{Error, Result};
pub use keywords::KeywordSpec;
pub use report::{render, OutputFormat, Report};
pub use sprint::SprintData;
pub use text::Document;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn read_document(path: &Path) -> Result<Document> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = raw.len(), "read document");
    Document::parse(&raw)
}

pub fn read_sprint_data(path: &Path) -> Result<SprintData> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = raw.len(), "read sprint data");
    SprintData::parse(&raw)
}
