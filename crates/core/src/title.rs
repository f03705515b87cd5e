//! Title reconstruction from the top of the first page.
//!
//! # Stages
//!
//! ```text
//! corrupted text layer? --yes--> span-level reconstruction
//!        | no
//!        v
//! block candidates in top 30%  ->  extended search (top 50%)
//!                              ->  final fallback (blocks starting in top 30%)
//!                              ->  largest candidate, repaired if repetitive
//!                              ->  normalisation
//! ```
//!
//! Every stage degrades locally; when nothing qualifies the title is empty.

use crate::model::{Block, Page};
use crate::text;

/// Fraction of the page height searched first.
const TITLE_AREA: f32 = 0.3;
/// Fraction searched when the first pass is inconclusive.
const EXTENDED_AREA: f32 = 0.5;

/// Spans at or above this multiple of body size feed span-level
/// reconstruction.
const SPAN_MIN_RATIO: f32 = 1.2;
/// Baseline jitter tolerated when regrouping spans into lines.
const LINE_Y_TOLERANCE: f32 = 5.0;
/// Subtitle continuation lines must be at least this large.
const CONTINUATION_MIN_SIZE: f32 = 20.0;
/// Reconstructed titles longer than this are rejected.
const MAX_TITLE_CHARS: usize = 200;

/// Standard-path gate: blocks below this ratio need [`STRICT_RATIO`].
const MODERATE_RATIO: f32 = 1.3;
const STRICT_RATIO: f32 = 1.5;
const LENIENT_RATIO: f32 = 1.2;
/// Flat ratio for the extended search.
const EXTENDED_RATIO: f32 = 1.5;
/// Ratio for the final fallback and for repair continuations.
const FALLBACK_RATIO: f32 = 1.3;

/// A ranked title candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleCandidate {
    pub size: f32,
    pub text: String,
}

impl TitleCandidate {
    fn from_block(block: &Block) -> Self {
        TitleCandidate {
            size: block.max_font_size(),
            text: block.text(),
        }
    }
}

/// A block whose text looks like duplicated or overlapping text layers.
pub fn is_corrupted_block(block: &Block) -> bool {
    let text = block.text();
    let words = text::words(&text);
    text::char_len(&text) > 50 && words.len() > 5 && text::is_repetitive(&words, 0.5)
}

/// Empty or colon-terminated blocks never make a title.
fn is_label_or_empty(text: &str) -> bool {
    let clean = text.trim();
    clean.is_empty() || clean.ends_with(':')
}

/// Extract the title of `page`, normally the document's first page.
pub fn extract_title(page: &Page, body: f32) -> String {
    let title_area = page.top_band(TITLE_AREA);
    let corrupted = page
        .blocks
        .iter()
        .filter(|b| b.bbox.intersects(&title_area))
        .any(is_corrupted_block);

    let mut candidates = if corrupted {
        log::debug!("overlapping text detected in title area, rebuilding from spans");
        reconstruct_from_spans(page, body).into_iter().collect()
    } else {
        standard_candidates(page, body)
    };

    if candidates.is_empty() || (candidates.len() == 1 && !corrupted) {
        let extended = extended_candidates(page, body);
        if !extended.is_empty() {
            log::debug!("extended title search found {} candidates", extended.len());
            candidates = extended;
        }
    }

    if candidates.is_empty() {
        candidates = fallback_candidates(page, body);
        log::debug!("title fallback found {} candidates", candidates.len());
    }

    let title = select_title(&candidates, page, body).unwrap_or_default();
    normalize_title(&title)
}

// ---------------------------------------------------------------------------
// Corrupted path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PlacedText {
    text: String,
    x: f32,
    y: f32,
    size: f32,
}

/// Group spans, sorted by `(y, x)`, into lines. Each span is compared with
/// the previous span's `y`, so a slowly drifting baseline stays one group.
fn group_by_baseline(spans: Vec<PlacedText>) -> Vec<Vec<PlacedText>> {
    let mut groups: Vec<Vec<PlacedText>> = Vec::new();
    let mut current: Vec<PlacedText> = Vec::new();
    let mut last_y: Option<f32> = None;

    for span in spans {
        let same_line = match last_y {
            None => true,
            Some(y) => (span.y - y).abs() <= LINE_Y_TOLERANCE,
        };
        last_y = Some(span.y);
        if !same_line && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
        current.push(span);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Rebuild the title from individual large spans in the top half of the page.
fn reconstruct_from_spans(page: &Page, body: f32) -> Option<TitleCandidate> {
    let area = page.top_band(EXTENDED_AREA);
    let mut spans: Vec<PlacedText> = page
        .blocks
        .iter()
        .filter(|b| b.bbox.intersects(&area))
        .flat_map(|b| b.spans())
        .filter(|s| s.size >= body * SPAN_MIN_RATIO && !s.text.trim().is_empty())
        .map(|s| PlacedText {
            text: s.text.trim().to_string(),
            x: s.bbox.x0,
            y: s.bbox.y0,
            size: s.size,
        })
        .collect();

    if spans.is_empty() {
        return None;
    }

    let max_size = spans.iter().map(|s| s.size).fold(0.0, f32::max);
    spans.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut parts: Vec<String> = Vec::new();
    let mut found_main = false;

    for mut group in group_by_baseline(spans) {
        group.sort_by(|a, b| a.x.total_cmp(&b.x));
        let joined = group
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let line = joined.trim();
        let words = text::words(line);

        if words.len() > 3 && text::is_repetitive(&words, 0.4) {
            continue;
        }

        if !found_main {
            if text::char_len(line) > 5 && line.contains(':') {
                parts.push(line.to_string());
                found_main = true;
            }
        } else if !line.is_empty()
            && !line.ends_with(':')
            && group[0].size >= CONTINUATION_MIN_SIZE
            && !text::ends_with_year(line)
            && text::is_mostly_distinct(&words, 0.8)
        {
            parts.push(line.to_string());
        }
    }

    let title = text::expand_acronym_prefix(&text::collapse_whitespace(&parts.join(" ")));

    if title.is_empty()
        || text::char_len(&title) > MAX_TITLE_CHARS
        || text::word_count(&title) < 2
    {
        log::debug!("span-level title reconstruction rejected: {title:?}");
        return None;
    }

    let text = if parts.len() > 1 {
        format!("{title}  ")
    } else {
        title
    };
    Some(TitleCandidate {
        size: max_size,
        text,
    })
}

// ---------------------------------------------------------------------------
// Block paths
// ---------------------------------------------------------------------------

/// Two-tier gate: a block below 1.3x body must clear 1.5x, one already past
/// 1.3x only needs 1.2x.
fn passes_standard_gate(size: f32, body: f32) -> bool {
    let ratio = if size < body * MODERATE_RATIO {
        STRICT_RATIO
    } else {
        LENIENT_RATIO
    };
    size >= body * ratio
}

fn standard_candidates(page: &Page, body: f32) -> Vec<TitleCandidate> {
    let area = page.top_band(TITLE_AREA);
    page.blocks
        .iter()
        .filter(|b| b.bbox.intersects(&area))
        .map(TitleCandidate::from_block)
        .filter(|c| !is_label_or_empty(&c.text) && passes_standard_gate(c.size, body))
        .collect()
}

/// Re-scan the top half with a flat 1.5x gate. Blocks that share the single
/// largest size are one title split across blocks and are joined.
fn extended_candidates(page: &Page, body: f32) -> Vec<TitleCandidate> {
    let area = page.top_band(EXTENDED_AREA);
    let found: Vec<TitleCandidate> = page
        .blocks
        .iter()
        .filter(|b| b.bbox.intersects(&area))
        .map(TitleCandidate::from_block)
        .filter(|c| !is_label_or_empty(&c.text) && c.size >= body * EXTENDED_RATIO)
        .collect();

    if found.len() < 2 {
        return found;
    }

    let largest = found.iter().map(|c| c.size).fold(0.0, f32::max);
    let same_size: Vec<&TitleCandidate> = found.iter().filter(|c| c.size == largest).collect();
    if same_size.len() < 2 {
        return found;
    }

    let combined: String = same_size
        .iter()
        .map(|c| format!("{}  ", c.text.trim_end()))
        .collect();
    vec![TitleCandidate {
        size: largest,
        text: combined,
    }]
}

/// Any block whose top edge sits in the top 30%, regardless of overlap.
fn fallback_candidates(page: &Page, body: f32) -> Vec<TitleCandidate> {
    let limit = page.height * TITLE_AREA;
    page.blocks
        .iter()
        .filter(|b| b.bbox.y0 <= limit)
        .map(TitleCandidate::from_block)
        .filter(|c| !is_label_or_empty(&c.text) && c.size >= body * FALLBACK_RATIO)
        .collect()
}

// ---------------------------------------------------------------------------
// Selection and repair
// ---------------------------------------------------------------------------

/// Largest candidate, first wins on ties.
fn best_candidate(candidates: &[TitleCandidate]) -> Option<&TitleCandidate> {
    let mut best: Option<&TitleCandidate> = None;
    for c in candidates {
        match best {
            Some(b) if c.size <= b.size => {}
            _ => best = Some(c),
        }
    }
    best
}

/// A block with long, varied words at a large size: the clean copy of a
/// title whose first rendering is garbled.
fn clean_continuation(page: &Page, body: f32) -> Option<String> {
    page.blocks.iter().find_map(|block| {
        let text = block.text();
        let words = text::words(&text);
        let qualifies = block.max_font_size() >= body * FALLBACK_RATIO
            && words.len() > 5
            && text::is_mostly_distinct(&words, 0.8)
            && text::average_word_len(&words) > 5.0;
        qualifies.then(|| text.trim().to_string())
    })
}

/// Repair a candidate whose words repeat too often.
fn repair_title(best: &str, page: &Page, body: f32) -> String {
    let words = text::words(best);

    let prefix: Vec<&str> = words
        .iter()
        .take(5)
        .take_while(|w| !text::has_letter_run(w, 2))
        .copied()
        .collect();

    match (prefix.is_empty(), clean_continuation(page, body)) {
        (false, Some(rest)) => format!("{} {}", prefix.join(" "), rest),
        (true, Some(rest)) => rest,
        (_, None) => {
            let kept: Vec<&str> = words
                .iter()
                .filter(|w| !text::has_letter_run(w, 3))
                .copied()
                .collect();
            if kept.len() >= 4 {
                kept.join(" ")
            } else {
                best.to_string()
            }
        }
    }
}

fn select_title(candidates: &[TitleCandidate], page: &Page, body: f32) -> Option<String> {
    let best = best_candidate(candidates)?;
    let words = text::words(&best.text);
    if words.len() > 5 && text::is_repetitive(&words, 0.6) {
        log::debug!("best title candidate is repetitive, attempting repair");
        return Some(repair_title(&best.text, page, body));
    }
    Some(best.text.clone())
}

/// Final formatting: leading whitespace removed, acronym prefix expanded, and
/// a trailing-space convention applied to multi-word titles (two spaces for
/// six or more words, one otherwise).
pub fn normalize_title(title: &str) -> String {
    let title = text::expand_acronym_prefix(title.trim_start());
    if title.is_empty() || title.ends_with("  ") || !title.contains(' ') {
        return title;
    }
    if text::word_count(&title) >= 6 {
        format!("{}  ", title.trim_end())
    } else if !title.ends_with(' ') {
        format!("{title} ")
    } else {
        title
    }
}
