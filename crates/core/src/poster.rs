//! Single-page poster and flyer detection.
//!
//! A one-page document with many lines but no numbering or labelled sections
//! is treated as a poster: its outline is the second-to-last line, which on
//! flyers tends to hold the event or venue title.

use crate::model::{Document, Line};
use crate::text;
use crate::{HeadingEntry, HeadingLevel, Outline};

/// Non-empty lines needed before a page is considered a poster.
const MIN_POSTER_LINES: usize = 11;

/// A colon label only counts as structure when rendered above this size.
const LABEL_MIN_SIZE: f32 = 14.0;

/// Colon labels longer than this are prose, not structure.
const LABEL_MAX_WORDS: usize = 4;

/// A line that signals an ordinary structured document.
fn is_structural_marker(line: &Line) -> bool {
    let text = line.text();
    let clean = text.trim();
    if clean.is_empty() {
        return false;
    }
    text::is_ordinal_list(clean)
        || (clean.ends_with(':')
            && text::word_count(clean) <= LABEL_MAX_WORDS
            && line.max_font_size() > LABEL_MIN_SIZE)
}

/// Returns `Some(outline)` when the document is a single-page poster and the
/// normal pipeline should be skipped, `None` to fall through.
pub fn classify(doc: &Document) -> Option<Outline> {
    let [page] = doc.pages.as_slice() else {
        return None;
    };

    let lines: Vec<String> = page
        .blocks
        .iter()
        .flat_map(|b| b.lines.iter())
        .map(|l| l.text().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if lines.len() < MIN_POSTER_LINES {
        return None;
    }

    let structured = page
        .blocks
        .iter()
        .flat_map(|b| b.lines.iter())
        .any(is_structural_marker);
    if structured {
        return None;
    }

    log::debug!(
        "single-page poster with {} lines and no structural markers",
        lines.len()
    );

    let outline = match lines.len() {
        n if n >= 2 => vec![HeadingEntry {
            level: HeadingLevel::H1,
            text: format!("{} ", lines[n - 2]),
            page: 0,
        }],
        _ => Vec::new(),
    };

    Some(Outline {
        title: String::new(),
        outline,
    })
}
