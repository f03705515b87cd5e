//! Heading-level assignment with noise suppression.
//!
//! Every block on every page is run through an ordered series of checks:
//!
//! ```text
//! margins -> fragment suppression -> noise rules -> width/length gates
//!         -> level ladder -> heading patterns -> level continuity
//! ```
//!
//! The noise rules, the level ladder and the heading patterns are tables of
//! named predicates evaluated in order, so each rule can be exercised on its
//! own. Scan state (recorded main headings, the previous level and position)
//! lives in a [`ScanState`] owned by a single extraction call.

use std::collections::HashSet;

use crate::model::{BBox, Block, Document};
use crate::text;
use crate::{HeadingEntry, HeadingLevel};

/// Blocks whose top edge is above this fraction of the page are headers.
const HEADER_BAND: f32 = 0.05;
/// Blocks whose top edge is below this fraction of the page are footers.
const FOOTER_BAND: f32 = 0.90;
/// Blocks wider than this fraction of the page are body text.
const WIDE_BLOCK: f32 = 0.85;
/// Blocks with more words than this are prose unless all-caps.
const MAX_HEADING_WORDS: usize = 25;
/// A level jump deeper than one step within this vertical distance is a
/// layout artifact.
const ARTIFACT_DISTANCE: f32 = 50.0;

/// A named predicate over a heading candidate.
pub type Rule = (&'static str, fn(&Candidate) -> bool);

/// A block prepared for classification.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Concatenated block text as rendered.
    pub raw: String,
    /// `raw` with surrounding whitespace removed.
    pub clean: String,
    pub size: f32,
    pub bold: bool,
    pub bbox: BBox,
    pub page: usize,
    pub page_width: f32,
    pub page_height: f32,
    pub body: f32,
    pub title: &'a str,
}

impl<'a> Candidate<'a> {
    pub fn new(
        block: &Block,
        page: usize,
        page_width: f32,
        page_height: f32,
        body: f32,
        title: &'a str,
    ) -> Self {
        let raw = block.text();
        let clean = raw.trim().to_string();
        Candidate {
            raw,
            clean,
            size: block.max_font_size(),
            bold: block.is_bold(),
            bbox: block.bbox,
            page,
            page_width,
            page_height,
            body,
            title,
        }
    }

    fn words(&self) -> Vec<&str> {
        text::words(&self.clean)
    }

    fn word_count(&self) -> usize {
        text::word_count(&self.clean)
    }

    fn ratio_at_least(&self, ratio: f32) -> bool {
        self.size >= self.body * ratio
    }

    fn is_upper(&self) -> bool {
        text::is_upper(&self.clean)
    }

    fn is_short_caps(&self) -> bool {
        text::is_short_caps(&self.clean)
    }
}

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// Font-ratio ladder; the first ratio the block reaches sets its level.
pub const LEVEL_LADDER: [(f32, HeadingLevel); 3] = [
    (1.35, HeadingLevel::H1),
    (1.05, HeadingLevel::H2),
    (1.0, HeadingLevel::H3),
];

fn inside_title(c: &Candidate) -> bool {
    !c.title.is_empty() && c.title.trim().contains(c.clean.as_str())
}

fn too_long(c: &Candidate) -> bool {
    text::char_len(&c.clean) > 100
}

fn repetitive(c: &Candidate) -> bool {
    let words = c.words();
    words.len() > 5 && text::is_repetitive(&words, 0.6)
}

fn mentions_year(c: &Candidate) -> bool {
    text::contains_bounded_year(&c.clean)
}

/// Short multi-word lines on the first page are subtitles and bylines.
fn first_page_byline(c: &Candidate) -> bool {
    c.page == 0 && c.word_count() > 3 && text::char_len(&c.clean) < 50
}

fn fragment_label(c: &Candidate) -> bool {
    let len = text::char_len(&c.clean);
    len <= 6 && c.clean.ends_with(':') && len <= 4
}

/// Blocks matching any of these are never headings.
pub const NOISE_RULES: &[Rule] = &[
    ("inside_title", inside_title),
    ("too_long", too_long),
    ("repetitive", repetitive),
    ("year", mentions_year),
    ("first_page_byline", first_page_byline),
    ("fragment_label", fragment_label),
];

fn short_caps(c: &Candidate) -> bool {
    c.is_short_caps()
}

fn bold_label(c: &Candidate) -> bool {
    c.bold && c.clean.ends_with(':')
}

fn ordinal(c: &Candidate) -> bool {
    text::is_ordinal_list(&c.clean)
}

fn capitalized(c: &Candidate) -> bool {
    text::starts_capitalized(&c.clean)
}

fn multi_word_caps(c: &Candidate) -> bool {
    c.is_upper() && c.word_count() > 1
}

fn bold_large(c: &Candidate) -> bool {
    c.bold && c.ratio_at_least(1.3)
}

fn large_short(c: &Candidate) -> bool {
    c.ratio_at_least(1.3) && c.word_count() <= 15
}

fn large_single_word(c: &Candidate) -> bool {
    c.word_count() == 1 && c.ratio_at_least(1.25)
}

/// A block must match at least one of these to be accepted.
pub const HEADING_PATTERNS: &[Rule] = &[
    ("short_caps", short_caps),
    ("bold_label", bold_label),
    ("ordinal", ordinal),
    ("capitalized", capitalized),
    ("multi_word_caps", multi_word_caps),
    ("bold_large", bold_large),
    ("large_short", large_short),
    ("large_single_word", large_single_word),
];

/// Name of the first rule in `rules` matching `candidate`.
pub fn first_match(rules: &[Rule], candidate: &Candidate) -> Option<&'static str> {
    rules
        .iter()
        .find(|(_, rule)| rule(candidate))
        .map(|(name, _)| *name)
}

/// Level from the font-ratio ladder, or H1 for a short all-caps block below
/// every ratio.
pub fn assign_level(candidate: &Candidate) -> Option<HeadingLevel> {
    LEVEL_LADDER
        .iter()
        .find(|(ratio, _)| candidate.ratio_at_least(*ratio))
        .map(|(_, level)| *level)
        .or_else(|| candidate.is_short_caps().then_some(HeadingLevel::H1))
}

fn in_margin(c: &Candidate) -> bool {
    c.bbox.y0 < c.page_height * HEADER_BAND || c.bbox.y0 > c.page_height * FOOTER_BAND
}

/// Wide blocks are body text unless short all-caps or already large.
fn is_wide_body(c: &Candidate) -> bool {
    if c.is_short_caps() {
        return false;
    }
    let has_heading_ratio = LEVEL_LADDER.iter().any(|(r, _)| c.ratio_at_least(*r));
    !has_heading_ratio && c.bbox.width() > c.page_width * WIDE_BLOCK
}

fn is_prose(c: &Candidate) -> bool {
    c.word_count() > MAX_HEADING_WORDS && !c.is_upper()
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// Sequential state threaded through one document's heading scan.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    main_headings: Vec<String>,
    previous_depth: u8,
    previous_y: f32,
}

impl ScanState {
    /// `text` shares a word with a recorded all-caps heading without being
    /// that heading, and adds at most two words: a sub-line fragment.
    pub fn is_fragment_of_main(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        let current: HashSet<&str> = upper.split_whitespace().collect();
        self.main_headings.iter().any(|main| {
            let main_upper = main.to_uppercase();
            let main_words: HashSet<&str> = main_upper.split_whitespace().collect();
            current.intersection(&main_words).next().is_some()
                && upper != main_upper
                && current.len() <= main_words.len() + 2
        })
    }

    pub fn record_main_heading(&mut self, text: &str) {
        self.main_headings.push(text.to_string());
    }

    /// Apply level continuity. Returns `false` for a jump of more than one
    /// level deeper within [`ARTIFACT_DISTANCE`] of the previous heading;
    /// otherwise updates the running level and position.
    pub fn admit(&mut self, level: HeadingLevel, y: f32) -> bool {
        let depth = level.depth();
        if depth < self.previous_depth {
            self.previous_depth = depth;
        } else if depth > self.previous_depth + 1 && (y - self.previous_y).abs() < ARTIFACT_DISTANCE
        {
            return false;
        } else {
            self.previous_depth = depth;
        }
        self.previous_y = y;
        true
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Classify one candidate, updating `state`. Returns the level when the block
/// is accepted as a heading.
pub fn classify_block(candidate: &Candidate, state: &mut ScanState) -> Option<HeadingLevel> {
    if candidate.clean.is_empty() || in_margin(candidate) {
        return None;
    }
    if state.is_fragment_of_main(&candidate.clean) {
        log::trace!("fragment of main heading: {:?}", candidate.clean);
        return None;
    }
    if let Some(rule) = first_match(NOISE_RULES, candidate) {
        log::trace!("noise rule {rule} rejected {:?}", candidate.clean);
        return None;
    }
    if is_wide_body(candidate) || is_prose(candidate) {
        return None;
    }

    let level = assign_level(candidate)?;
    first_match(HEADING_PATTERNS, candidate)?;

    if candidate.is_short_caps() {
        state.record_main_heading(&candidate.clean);
    }

    if !state.admit(level, candidate.bbox.y0) {
        log::trace!("layout artifact skipped: {:?}", candidate.clean);
        return None;
    }
    log::trace!("{level} accepted: {:?}", candidate.clean);
    Some(level)
}

/// Scan every page and block in order and collect the outline.
pub fn extract_headings(doc: &Document, body: f32, title: &str) -> Vec<HeadingEntry> {
    let mut state = ScanState::default();
    let mut headings = Vec::new();

    for (page_index, page) in doc.pages.iter().enumerate() {
        for block in &page.blocks {
            let candidate =
                Candidate::new(block, page_index, page.width, page.height, body, title);
            if let Some(level) = classify_block(&candidate, &mut state) {
                headings.push(HeadingEntry {
                    level,
                    text: format!("{} ", candidate.raw.trim_end()),
                    page: page_index,
                });
            }
        }
    }

    drop_title_echo(&mut headings, title);
    headings
}

/// Remove the first heading when it repeats the title.
pub fn drop_title_echo(headings: &mut Vec<HeadingEntry>, title: &str) {
    if headings
        .first()
        .is_some_and(|h| h.text.trim() == title.trim())
    {
        headings.remove(0);
    }
}
