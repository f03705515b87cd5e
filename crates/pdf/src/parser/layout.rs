//! Content stream to Document Text Model.
//!
//! Walking a page's operators yields positioned [`TextRun`]s in PDF user
//! space (origin bottom-left). Those are flipped to a top-left origin, cleaned,
//! and grouped into lines and blocks.
//!
//! ```text
//! content ops  ->  TextRun[]  ->  Span[]  ->  Line[]  ->  Block[]
//!                  extract        to_span     group_into_lines
//!                                             group_into_blocks
//! ```

use std::cmp::Ordering;

use docoutline_core::{BBox, Block, Document, Line, Page, Span};

use super::backend::{FontResource, PageId, PdfBackend, PdfValue, DEFAULT_PAGE_SIZE};
use crate::cleanup::clean_span_text;
use crate::PdfError;

/// A run of text as painted by one show operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    /// Baseline in PDF user space, growing upward.
    pub baseline: f32,
    pub width: f32,
    pub size: f32,
    pub font: String,
    pub bold: bool,
}

/// Runs whose baselines differ by at most this share a line.
const BASELINE_TOLERANCE: f32 = 1.0;

/// Glyph advance as a fraction of the font size; no width tables are read.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Gaps narrower than this join two runs without a space.
const MIN_WORD_GAP: f32 = 1.5;

/// A baseline step larger than this multiple of the line's size opens a new
/// block.
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Sizes closer than this count as the same style when merging runs.
const SIZE_EPSILON: f32 = 0.5;

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Scripts written without inter-word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x20000..=0x2A6DF
            | 0xF900..=0xFAFF
            | 0x3040..=0x30FF
            | 0x31F0..=0x31FF
            | 0xAC00..=0xD7AF
            | 0x1100..=0x11FF
            | 0x3130..=0x318F
            | 0x3000..=0x303F
            | 0xFF00..=0xFFEF
            | 0x0E00..=0x0EFF
    )
}

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    bold: bool,
    /// `[a, b, c, d, e, f]` of the text matrix.
    matrix: [f32; 6],
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            bold: false,
            matrix: IDENTITY,
            line_matrix: IDENTITY,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.matrix[4]
    }

    fn baseline(&self) -> f32 {
        self.matrix[5] + self.rise
    }

    /// Font size scaled by the vertical component of the text matrix.
    fn effective_size(&self) -> f32 {
        let scale = (self.matrix[1].powi(2) + self.matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn rendered_width(&self, text: &str) -> f32 {
        text.chars().count() as f32
            * self.effective_size()
            * APPROX_CHAR_WIDTH_RATIO
            * self.horiz_scale
    }

    fn advance(&mut self, dx: f32) {
        self.matrix[4] += dx * self.matrix[0];
        self.matrix[5] += dx * self.matrix[1];
    }

    /// Move past `text` using the current spacing parameters.
    fn advance_over(&mut self, text: &str) {
        let glyph = self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale;
        let dx: f32 = text
            .chars()
            .map(|c| {
                let word = if c == ' ' { self.word_spacing } else { 0.0 };
                glyph + self.char_spacing + word
            })
            .sum();
        self.advance(dx);
    }

    /// `Td`: translate the line matrix and restart the text matrix there.
    fn next_line(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, e, f] = self.line_matrix;
        self.line_matrix[4] = a * tx + c * ty + e;
        self.line_matrix[5] = b * tx + d * ty + f;
        self.matrix = self.line_matrix;
    }

    fn set_font(&mut self, key: Vec<u8>, base_font: &str, size: f32) {
        self.font_key = key;
        self.font_size = size;
        self.font_name = base_font.to_string();
        self.bold = base_font.to_uppercase().contains("BOLD");
    }

    fn run(&self, text: String, x: f32) -> TextRun {
        TextRun {
            width: self.rendered_width(&text),
            text,
            x,
            baseline: self.baseline(),
            size: self.effective_size(),
            font: self.font_name.clone(),
            bold: self.bold,
        }
    }
}

fn number(operands: &[PdfValue], i: usize) -> Option<f32> {
    operands.get(i).and_then(PdfValue::as_f32)
}

fn decode(value: &PdfValue, backend: &dyn PdfBackend, page: PageId, state: &TextState) -> String {
    match value {
        PdfValue::Str(bytes) => backend.decode_text(page, &state.font_key, bytes),
        _ => String::new(),
    }
}

/// Walk one page's content stream and collect every painted run.
///
/// Handles `BT ET Tf Tm Td TD T* TL Tc Tw Tz Ts Tj TJ ' "`; other operators
/// are ignored.
pub fn extract_page_runs(backend: &dyn PdfBackend, page: PageId) -> Result<Vec<TextRun>, PdfError> {
    let raw = backend.page_content(page)?;
    let ops = backend.decode_content(&raw)?;
    let fonts = backend.page_fonts(page).unwrap_or_default();

    let mut state = TextState::default();
    let mut runs = Vec::new();

    for op in &ops {
        let args = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.matrix = IDENTITY;
                state.line_matrix = IDENTITY;
            }
            // Font state survives ET.
            "ET" => {}
            "Tf" => set_font(args, &fonts, &mut state),
            "Tm" => {
                let m: Vec<f32> = args.iter().take(6).filter_map(PdfValue::as_f32).collect();
                if let [a, b, c, d, e, f] = m[..] {
                    state.matrix = [a, b, c, d, e, f];
                    state.line_matrix = state.matrix;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(args, 0), number(args, 1)) {
                    state.next_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(args, 0), number(args, 1)) {
                    state.leading = -ty;
                    state.next_line(tx, ty);
                }
            }
            "T*" => state.next_line(0.0, -state.leading),
            "TL" => state.leading = number(args, 0).unwrap_or(state.leading),
            "Tc" => state.char_spacing = number(args, 0).unwrap_or(state.char_spacing),
            "Tw" => state.word_spacing = number(args, 0).unwrap_or(state.word_spacing),
            "Tz" => {
                if let Some(v) = number(args, 0) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => state.rise = number(args, 0).unwrap_or(state.rise),
            "Tj" => {
                if let Some(s) = args.first() {
                    show(s, backend, page, &mut state, &mut runs);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = args.first() {
                    show_array(items, backend, page, &mut state, &mut runs);
                }
            }
            "'" => {
                state.next_line(0.0, -state.leading);
                if let Some(s) = args.first() {
                    show(s, backend, page, &mut state, &mut runs);
                }
            }
            "\"" => {
                if let [aw, ac, s, ..] = args {
                    state.word_spacing = aw.as_f32().unwrap_or(state.word_spacing);
                    state.char_spacing = ac.as_f32().unwrap_or(state.char_spacing);
                    state.next_line(0.0, -state.leading);
                    show(s, backend, page, &mut state, &mut runs);
                }
            }
            _ => {}
        }
    }

    Ok(runs)
}

fn set_font(args: &[PdfValue], fonts: &[FontResource], state: &mut TextState) {
    let (Some(PdfValue::Name(key)), Some(size)) = (args.first(), number(args, 1)) else {
        return;
    };
    let base = fonts
        .iter()
        .find(|f| &f.key == key)
        .and_then(|f| f.base_font.clone())
        .unwrap_or_else(|| String::from_utf8_lossy(key).into_owned());
    state.set_font(key.clone(), &base, size);
}

fn show(
    operand: &PdfValue,
    backend: &dyn PdfBackend,
    page: PageId,
    state: &mut TextState,
    runs: &mut Vec<TextRun>,
) {
    let text = decode(operand, backend, page, state);
    if text.is_empty() {
        return;
    }
    runs.push(state.run(text.clone(), state.x()));
    state.advance_over(&text);
}

/// `TJ` strings form one run; kerning wide enough to read as a word gap
/// becomes a space.
fn show_array(
    items: &[PdfValue],
    backend: &dyn PdfBackend,
    page: PageId,
    state: &mut TextState,
    runs: &mut Vec<TextRun>,
) {
    let start = state.x();
    let mut text = String::new();

    for item in items {
        if let Some(adjust) = item.as_f32() {
            let dx = -adjust / 1000.0 * state.font_size * state.horiz_scale;
            let word_gap = state.font_size * APPROX_CHAR_WIDTH_RATIO * state.horiz_scale * 0.3;
            if dx > word_gap && !text.is_empty() {
                text.push(' ');
            }
            state.advance(dx);
        } else {
            let fragment = decode(item, backend, page, state);
            text.push_str(&fragment);
            state.advance_over(&fragment);
        }
    }

    let text = text.trim_end();
    if !text.is_empty() {
        runs.push(state.run(text.to_string(), start));
    }
}

/// Flip a run into top-left page coordinates and clean its text.
pub fn to_span(run: &TextRun, page_height: f32) -> Span {
    let bottom = page_height - run.baseline;
    Span {
        text: clean_span_text(&run.text),
        size: run.size,
        font: run.font.clone(),
        bold: run.bold,
        bbox: BBox::new(run.x, bottom - run.size, run.x + run.width, bottom),
    }
}

fn same_style(a: &Span, b: &Span) -> bool {
    a.font == b.font && a.bold == b.bold && (a.size - b.size).abs() < SIZE_EPSILON
}

fn needs_space(prev: &Span, next: &Span) -> bool {
    match (prev.text.chars().next_back(), next.text.chars().next()) {
        (Some(l), Some(f)) => {
            !l.is_whitespace()
                && !f.is_whitespace()
                && !(is_spaceless_script_char(l) && is_spaceless_script_char(f))
        }
        _ => false,
    }
}

/// Order one line's spans left to right, merging touching runs of the same
/// style and separating words.
fn assemble_line(mut spans: Vec<Span>) -> Line {
    spans.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(prev) = merged.last_mut() {
            let gap = span.bbox.x0 - prev.bbox.x1;
            let spaced = gap >= MIN_WORD_GAP && needs_space(prev, &span);

            if same_style(prev, &span) && gap > -prev.size && gap < prev.size * 2.0 {
                if spaced {
                    prev.text.push(' ');
                }
                prev.text.push_str(&span.text);
                prev.bbox = prev.bbox.union(&span.bbox);
                continue;
            }
            if spaced {
                prev.text.push(' ');
            }
        }
        merged.push(span);
    }

    Line { spans: merged }
}

fn line_bottom(line: &Line) -> f32 {
    line.spans.iter().map(|s| s.bbox.y1).fold(f32::MIN, f32::max)
}

/// Group spans sharing a baseline, top of the page first.
pub fn group_into_lines(mut spans: Vec<Span>) -> Vec<Line> {
    spans.retain(|s| !s.text.is_empty());
    spans.sort_by(|a, b| {
        a.bbox
            .y1
            .partial_cmp(&b.bbox.y1)
            .unwrap_or(Ordering::Equal)
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut baseline = 0.0;

    for span in spans {
        if !current.is_empty() && (span.bbox.y1 - baseline).abs() > BASELINE_TOLERANCE {
            lines.push(assemble_line(std::mem::take(&mut current)));
        }
        if current.is_empty() {
            baseline = span.bbox.y1;
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

fn close_block(lines: Vec<Line>, page: usize) -> Block {
    let bbox = lines
        .iter()
        .flat_map(|l| l.spans.iter())
        .map(|s| s.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default();
    Block { lines, bbox, page }
}

/// Stack consecutive lines into blocks until the vertical step between
/// baselines exceeds [`BLOCK_GAP_FACTOR`] times the previous line's size.
pub fn group_into_blocks(lines: Vec<Line>, page: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            let step = line_bottom(&line) - line_bottom(prev);
            if step > prev.max_font_size() * BLOCK_GAP_FACTOR {
                blocks.push(close_block(std::mem::take(&mut current), page));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(close_block(current, page));
    }

    blocks
}

/// Lay out one page's runs. `size` is `(width, height)`.
pub fn build_page(index: usize, size: (f32, f32), runs: &[TextRun]) -> Page {
    let (width, height) = size;
    let spans = runs.iter().map(|r| to_span(r, height)).collect();
    Page {
        index,
        width,
        height,
        blocks: group_into_blocks(group_into_lines(spans), index),
    }
}

/// Build the text model for every page. Pages that cannot be read become
/// empty pages so page numbering stays aligned.
pub fn extract_document(backend: &dyn PdfBackend) -> Document {
    let pages = backend
        .pages()
        .into_values()
        .enumerate()
        .map(|(index, id)| {
            let size = backend.page_size(id).unwrap_or_else(|e| {
                log::warn!("page {index}: {e}, assuming letter size");
                DEFAULT_PAGE_SIZE
            });
            let runs = extract_page_runs(backend, id).unwrap_or_else(|e| {
                log::warn!("page {index}: {e}, treating as empty");
                Vec::new()
            });
            build_page(index, size, &runs)
        })
        .collect();

    Document::new(pages)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::super::backend::{decode_text_simple, ContentOp};
    use super::*;

    struct MockBackend {
        page_ids: BTreeMap<u32, PageId>,
        fonts: Vec<FontResource>,
        /// Pre-decoded operators per page; a missing page fails to read.
        ops: HashMap<PageId, Vec<ContentOp>>,
    }

    impl MockBackend {
        fn single(ops: Vec<ContentOp>) -> Self {
            Self::with_pages(vec![ops])
        }

        fn with_pages(pages: Vec<Vec<ContentOp>>) -> Self {
            let ids: Vec<PageId> = (0..pages.len()).map(|i| (i as u32 + 10, 0)).collect();
            MockBackend {
                page_ids: ids.iter().enumerate().map(|(i, &id)| (i as u32 + 1, id)).collect(),
                fonts: vec![font(b"F1", "Helvetica"), font(b"F2", "Helvetica-Bold")],
                ops: ids.into_iter().zip(pages).collect(),
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            self.page_ids.clone()
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<FontResource>, PdfError> {
            Ok(self.fonts.clone())
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
            // The page id travels through the bytes so decode_content can find
            // the stored operators.
            if self.ops.contains_key(&page) {
                Ok(page.0.to_be_bytes().to_vec())
            } else {
                Err(PdfError::Parse("broken content stream".into()))
            }
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            let id = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
            Ok(self.ops.get(&(id, 0)).cloned().unwrap_or_default())
        }

        fn decode_text(&self, _page: PageId, _font_key: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }

        fn page_size(&self, _page: PageId) -> Result<(f32, f32), PdfError> {
            Ok((612.0, 792.0))
        }
    }

    fn font(key: &[u8], base: &str) -> FontResource {
        FontResource {
            key: key.to_vec(),
            base_font: Some(base.to_string()),
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn tf(key: &[u8], size: f32) -> ContentOp {
        op("Tf", vec![PdfValue::Name(key.to_vec()), PdfValue::Real(size)])
    }

    fn tm(x: f32, y: f32) -> ContentOp {
        op(
            "Tm",
            [1.0, 0.0, 0.0, 1.0, x, y].into_iter().map(PdfValue::Real).collect(),
        )
    }

    fn tj(text: &str) -> ContentOp {
        op("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())])
    }

    /// `BT /F<key> size Tf 1 0 0 1 x y Tm (text) Tj ET`
    fn text_at(key: &[u8], size: f32, x: f32, y: f32, text: &str) -> Vec<ContentOp> {
        vec![op("BT", vec![]), tf(key, size), tm(x, y), tj(text), op("ET", vec![])]
    }

    fn run(text: &str, x: f32, baseline: f32, size: f32) -> TextRun {
        TextRun {
            text: text.to_string(),
            x,
            baseline,
            width: text.chars().count() as f32 * size * APPROX_CHAR_WIDTH_RATIO,
            size,
            font: "Helvetica".to_string(),
            bold: false,
        }
    }

    #[test]
    fn test_extract_simple_show() {
        let backend = MockBackend::single(text_at(b"F1", 12.0, 72.0, 700.0, "Hello World"));
        let runs = extract_page_runs(&backend, (10, 0)).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello World");
        assert!((runs[0].x - 72.0).abs() < 0.01);
        assert!((runs[0].baseline - 700.0).abs() < 0.01);
        assert!((runs[0].size - 12.0).abs() < 0.01);
        assert!(!runs[0].bold);
    }

    #[test]
    fn test_bold_detected_from_base_font() {
        let backend = MockBackend::single(text_at(b"F2", 14.0, 72.0, 750.0, "Bold Title"));
        let runs = extract_page_runs(&backend, (10, 0)).unwrap();
        assert!(runs[0].bold);
        assert_eq!(runs[0].font, "Helvetica-Bold");
    }

    #[test]
    fn test_unknown_font_key_keeps_key_name() {
        let backend = MockBackend::single(text_at(b"F9", 12.0, 72.0, 700.0, "x"));
        let runs = extract_page_runs(&backend, (10, 0)).unwrap();
        assert_eq!(runs[0].font, "F9");
    }

    #[test]
    fn test_matrix_scale_sets_effective_size() {
        let backend = MockBackend::single(vec![
            op("BT", vec![]),
            tf(b"F1", 1.0),
            op(
                "Tm",
                [18.0, 0.0, 0.0, 18.0, 72.0, 700.0]
                    .into_iter()
                    .map(PdfValue::Real)
                    .collect(),
            ),
            tj("Scaled"),
            op("ET", vec![]),
        ]);
        let runs = extract_page_runs(&backend, (10, 0)).unwrap();
        assert!((runs[0].size - 18.0).abs() < 0.01);
    }

    #[test]
    fn test_tj_array_kerning() {
        let backend = MockBackend::single(vec![
            op("BT", vec![]),
            tf(b"F1", 12.0),
            tm(72.0, 700.0),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"Hel".to_vec()),
                    PdfValue::Integer(-10),
                    PdfValue::Str(b"lo".to_vec()),
                    PdfValue::Integer(-500),
                    PdfValue::Str(b"World".to_vec()),
                ])],
            ),
            op("ET", vec![]),
        ]);
        let runs = extract_page_runs(&backend, (10, 0)).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello World");
        assert!((runs[0].x - 72.0).abs() < 0.01);
    }

    #[test]
    fn test_leading_moves_down() {
        let backend = MockBackend::single(vec![
            op("BT", vec![]),
            tf(b"F1", 12.0),
            tm(72.0, 700.0),
            op("TL", vec![PdfValue::Real(14.0)]),
            tj("first"),
            op("T*", vec![]),
            tj("second"),
            op("'", vec![PdfValue::Str(b"third".to_vec())]),
            op(
                "\"",
                vec![
                    PdfValue::Real(0.0),
                    PdfValue::Real(0.0),
                    PdfValue::Str(b"fourth".to_vec()),
                ],
            ),
            op("ET", vec![]),
        ]);
        let runs = extract_page_runs(&backend, (10, 0)).unwrap();
        let baselines: Vec<f32> = runs.iter().map(|r| r.baseline).collect();
        assert_eq!(baselines, vec![700.0, 686.0, 672.0, 658.0]);
        assert!(runs.iter().all(|r| (r.x - 72.0).abs() < 0.01));
    }

    #[test]
    fn test_td_capital_sets_leading() {
        let backend = MockBackend::single(vec![
            op("BT", vec![]),
            tf(b"F1", 10.0),
            op("Td", vec![PdfValue::Real(50.0), PdfValue::Real(600.0)]),
            tj("a"),
            op("TD", vec![PdfValue::Real(0.0), PdfValue::Real(-20.0)]),
            tj("b"),
            op("T*", vec![]),
            tj("c"),
            op("ET", vec![]),
        ]);
        let runs = extract_page_runs(&backend, (10, 0)).unwrap();
        let baselines: Vec<f32> = runs.iter().map(|r| r.baseline).collect();
        assert_eq!(baselines, vec![600.0, 580.0, 560.0]);
    }

    #[test]
    fn test_empty_strings_are_not_runs() {
        let backend = MockBackend::single(text_at(b"F1", 12.0, 72.0, 700.0, ""));
        assert!(extract_page_runs(&backend, (10, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_to_span_flips_to_top_left() {
        let span = to_span(&run("Title", 72.0, 700.0, 20.0), 792.0);
        assert_eq!(span.bbox, BBox::new(72.0, 72.0, 122.0, 92.0));
        assert_eq!(span.text, "Title");
    }

    #[test]
    fn test_to_span_cleans_text() {
        let span = to_span(&run("\u{FB01}nance", 72.0, 700.0, 12.0), 792.0);
        assert_eq!(span.text, "finance");
    }

    #[test]
    fn test_lines_group_within_tolerance() {
        let spans = vec![
            to_span(&run("B", 100.0, 699.5, 12.0), 792.0),
            to_span(&run("A", 72.0, 700.0, 12.0), 792.0),
            to_span(&run("C", 72.0, 680.0, 12.0), 792.0),
        ];
        let lines = group_into_lines(spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "A B");
        assert_eq!(lines[1].text(), "C");
    }

    #[test]
    fn test_adjacent_runs_merge_without_space() {
        // "Hel" is 3 chars * 6 wide, so "lo" starts right where it ends.
        let spans = vec![
            to_span(&run("Hel", 72.0, 700.0, 12.0), 792.0),
            to_span(&run("lo", 90.0, 700.0, 12.0), 792.0),
        ];
        let lines = group_into_lines(spans);
        assert_eq!(lines[0].spans.len(), 1);
        assert_eq!(lines[0].text(), "Hello");
    }

    #[test]
    fn test_style_change_keeps_separate_spans() {
        let mut bold = to_span(&run("Note:", 72.0, 700.0, 12.0), 792.0);
        bold.bold = true;
        bold.font = "Helvetica-Bold".to_string();
        let plain = to_span(&run("read this", 110.0, 700.0, 12.0), 792.0);
        let lines = group_into_lines(vec![plain, bold]);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].text(), "Note: read this");
    }

    #[test]
    fn test_cjk_runs_join_without_space() {
        let spans = vec![
            to_span(&run("日本", 72.0, 700.0, 12.0), 792.0),
            to_span(&run("語", 90.0, 700.0, 12.0), 792.0),
        ];
        assert_eq!(group_into_lines(spans)[0].text(), "日本語");
    }

    #[test]
    fn test_blocks_break_on_large_gap() {
        let spans = vec![
            to_span(&run("Heading", 72.0, 700.0, 12.0), 792.0),
            to_span(&run("first line", 72.0, 660.0, 12.0), 792.0),
            to_span(&run("second line", 72.0, 646.0, 12.0), 792.0),
        ];
        let blocks = group_into_blocks(group_into_lines(spans), 3);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "Heading");
        assert_eq!(blocks[1].lines.len(), 2);
        assert_eq!(blocks[1].text(), "first linesecond line");
        assert_eq!(blocks[1].page, 3);
        assert!((blocks[1].bbox.y0 - 120.0).abs() < 0.01);
        assert!((blocks[1].bbox.y1 - 146.0).abs() < 0.01);
    }

    #[test]
    fn test_extract_document_keeps_unreadable_pages() {
        let mut backend = MockBackend::with_pages(vec![
            text_at(b"F2", 20.0, 72.0, 700.0, "Annual Report"),
            vec![],
            text_at(b"F1", 10.0, 72.0, 700.0, "Appendix"),
        ]);
        // Page 2 loses its content stream.
        backend.ops.remove(&(11, 0));

        let doc = extract_document(&backend);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.pages[0].blocks[0].text(), "Annual Report");
        assert!(doc.pages[0].blocks[0].is_bold());
        assert!(doc.pages[1].blocks.is_empty());
        assert_eq!(doc.pages[2].index, 2);
        assert_eq!(doc.pages[2].blocks[0].page, 2);
    }
}
