//! Form versus structured-document classification.
//!
//! Application forms are dominated by short numbered field labels
//! (`"1. Name"`, `"2. Designation"`). Their "headings" are labels, so a form
//! gets an empty outline.

use crate::model::Document;
use crate::text;

/// Numbered field labels with more words than this are prose list items.
const FIELD_MAX_WORDS: usize = 8;
/// Numbered fields needed before the document can be a form.
const MIN_NUMBERED_FIELDS: usize = 5;

const FORM_TITLE_MAX_WORDS: usize = 9;
const FORM_TITLE_MAX_AVG_WORD_LEN: f64 = 5.5;
const FORM_TITLE_MAX_CHARS: usize = 35;

const COMPLEX_TITLE_MIN_WORDS: usize = 10;
const COMPLEX_TITLE_LONG_WORD: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Form,
    Structured,
}

/// Count blocks shaped like `"<int>. <Capital>..."` with at most eight words.
pub fn count_numbered_fields(doc: &Document) -> usize {
    doc.pages
        .iter()
        .flat_map(|p| p.blocks.iter())
        .map(|b| b.text())
        .filter(|t| {
            let clean = t.trim();
            text::is_numbered_field(clean) && text::word_count(clean) <= FIELD_MAX_WORDS
        })
        .count()
}

/// Long, punctuated, or technical titles belong to structured documents.
pub fn is_complex_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    let words = text::words(&lower);
    words.len() >= COMPLEX_TITLE_MIN_WORDS
        || title.contains(':')
        || words.iter().any(|w| text::char_len(w) > COMPLEX_TITLE_LONG_WORD)
}

/// Decide the document kind from the finished title and the number of
/// numbered fields.
pub fn classify_with_fields(title: &str, numbered_fields: usize) -> DocumentKind {
    let lower = title.to_lowercase();
    let words = text::words(&lower);
    let chars_without_spaces = title.chars().filter(|&c| c != ' ').count();

    let form = words.len() <= FORM_TITLE_MAX_WORDS
        && numbered_fields >= MIN_NUMBERED_FIELDS
        && text::average_word_len(&words) <= FORM_TITLE_MAX_AVG_WORD_LEN
        && chars_without_spaces <= FORM_TITLE_MAX_CHARS
        && !is_complex_title(title);

    if form {
        DocumentKind::Form
    } else {
        DocumentKind::Structured
    }
}

pub fn classify(doc: &Document, title: &str) -> DocumentKind {
    let fields = count_numbered_fields(doc);
    let kind = classify_with_fields(title, fields);
    log::debug!("{fields} numbered fields, classified as {kind:?}");
    kind
}
