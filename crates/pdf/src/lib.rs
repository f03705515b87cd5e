//! PDF adapter for docoutline.
//!
//! Parses PDF bytes with `lopdf` and produces the [`Document`] text model the
//! core analyses. Geometry is reported with a top-left origin.

use std::path::Path;

use docoutline_core::Document;
use thiserror::Error;

use parser::backend::{LopdfBackend, PdfBackend};

pub mod cleanup;
pub mod parser;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse PDF bytes into a text model.
///
/// Unreadable pages become empty pages; only a document that cannot be
/// opened at all is an error.
pub fn load_document(bytes: &[u8]) -> Result<Document, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    log::debug!("loaded PDF with {} pages", backend.pages().len());
    Ok(parser::layout::extract_document(&backend))
}

/// Read and parse the PDF at `path`.
pub fn load_path(path: &Path) -> Result<Document, PdfError> {
    let bytes = std::fs::read(path)?;
    load_document(&bytes)
}
