//! Core library for docoutline
//!
//! This crate implements the **Functional Core** of docoutline: it infers a
//! document's title and H1/H2/H3 outline from typeset text runs, using only
//! geometric and typographic signals.
//!
//! # Architecture Overview
//!
//! - **`docoutline_core`** (this crate): the heuristic pipeline, with zero I/O
//! - **`pdf`**: turns PDF bytes into the [`Document`] text model
//! - **`docoutline`**: batch orchestration and JSON output (the Imperative Shell)
//!
//! Every function here is deterministic. Scan state lives in values owned by
//! a single [`extract`] call, so documents can be processed in parallel by
//! the caller without coordination.
//!
//! # Pipeline
//!
//! ```text
//! Document -> poster check -> font statistics -> title -> form check -> headings
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use docoutline_core::{extract, Document};
//!
//! let doc: Document = serde_json::from_str(&layout_json)?;
//! let outline = extract(&doc);
//! println!("{}", serde_json::to_string_pretty(&outline)?);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod doc_type;
pub mod font_stats;
pub mod headings;
pub mod model;
pub mod poster;
pub mod text;
pub mod title;

pub use doc_type::DocumentKind;
pub use font_stats::FontStats;
pub use model::{BBox, Block, Document, Line, Page, Span};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document contains no text spans")]
    EmptyDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Nesting depth, 1 for H1.
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// One outline entry. `page` is 0-based.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HeadingEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: usize,
}

/// The title and outline of one document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<HeadingEntry>,
}

impl Outline {
    /// The result persisted for documents that cannot be analysed.
    pub fn empty() -> Self {
        Outline::default()
    }
}

/// Run the full pipeline, surfacing the one failure that stops analysis.
pub fn try_extract(doc: &Document) -> Result<Outline, ExtractError> {
    if let Some(poster) = poster::classify(doc) {
        return Ok(poster);
    }

    let stats = FontStats::from_document(doc);
    let body = stats.body_size().ok_or(ExtractError::EmptyDocument)?;
    let first_page = doc.pages.first().ok_or(ExtractError::EmptyDocument)?;
    log::debug!("body font size {body}");

    let title = title::extract_title(first_page, body);

    if doc_type::classify(doc, &title) == DocumentKind::Form {
        return Ok(Outline {
            title,
            outline: Vec::new(),
        });
    }

    let outline = headings::extract_headings(doc, body, &title);
    Ok(Outline { title, outline })
}

/// Infer the title and outline of `doc`. Documents that cannot be analysed
/// yield [`Outline::empty`].
pub fn extract(doc: &Document) -> Outline {
    try_extract(doc).unwrap_or_else(|e| {
        log::debug!("{e}, returning empty outline");
        Outline::empty()
    })
}
