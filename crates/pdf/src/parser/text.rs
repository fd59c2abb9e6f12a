//! Text runs with font metrics, read from page content streams.
//!
//! ```text
//! content ops -> Span[] (one per show operator) -> TextLine[] (same baseline)
//! ```
//!
//! Glyph widths are not read from the fonts; horizontal advances use an
//! average character width, which is enough to tell word gaps from column
//! gaps.

use std::collections::BTreeMap;

use super::backend::{
    get_number_from_value, BackendFontInfo, ContentOp, PageId, PdfBackend, PdfValue,
};
use crate::{PageText, PdfError, TextLine};

/// Spans whose baselines differ by no more than this share a line.
const Y_TOLERANCE: f32 = 1.0;

/// Average glyph width as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Horizontal gap, in points, above which a space separates two spans.
const MIN_WORD_GAP: f32 = 1.5;

/// A `TJ` adjustment wider than this fraction of a glyph is a word break.
const TJ_SPACE_FRACTION: f32 = 0.3;

const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text shown by one operator, positioned in user space.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
}

// ---------------------------------------------------------------------------
// Text state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    /// [a, b, c, d, tx, ty]
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5] + self.text_rise
    }

    /// Rendered size: the font size scaled by the text matrix.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn glyph_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        let m = self.line_matrix;
        self.line_matrix[4] = m[0] * tx + m[2] * ty + m[4];
        self.line_matrix[5] = m[1] * tx + m[3] * ty + m[5];
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    /// Move past `text` and return the distance in text space.
    fn advance_text(&mut self, text: &str) -> f32 {
        let glyph = self.glyph_width();
        let dx: f32 = text
            .chars()
            .map(|c| {
                let extra = if c == ' ' { self.word_spacing } else { 0.0 };
                glyph + self.char_spacing + extra
            })
            .sum();
        self.advance_x(dx);
        dx
    }

    fn span(&self, text: String, x: f32, y: f32, advance: f32) -> Span {
        let style = self.font_name.to_uppercase();
        Span {
            text,
            x,
            y,
            width: advance * self.text_matrix[0].abs().max(f32::EPSILON),
            font_size: self.effective_font_size(),
            font_name: self.font_name.clone(),
            is_bold: style.contains("BOLD") || style.contains("BLACK") || style.contains("HEAVY"),
            is_italic: style.contains("ITALIC") || style.contains("OBLIQUE"),
        }
    }
}

fn number(operands: &[PdfValue], idx: usize) -> Option<f32> {
    operands.get(idx).and_then(get_number_from_value)
}

fn set_font(operands: &[PdfValue], fonts: &[BackendFontInfo], state: &mut TextState) {
    let key = match operands.first() {
        Some(PdfValue::Name(n)) | Some(PdfValue::Str(n)) => n.clone(),
        _ => return,
    };
    state.font_size = number(operands, 1).unwrap_or(0.0);
    state.font_name = fonts
        .iter()
        .find(|info| info.name == key)
        .and_then(|info| info.base_font.clone())
        .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());
    state.font_key = key;
}

fn decode(
    val: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &TextState,
) -> Option<String> {
    match val {
        PdfValue::Str(bytes) => Some(backend.decode_text(page_id, &state.font_key, bytes)),
        _ => None,
    }
}

fn show_string(
    operand: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<Span>,
) {
    let Some(text) = decode(operand, backend, page_id, state) else {
        return;
    };
    let (x, y) = (state.x(), state.y());
    let advance = state.advance_text(&text);
    if !text.trim().is_empty() {
        spans.push(state.span(text, x, y, advance));
    }
}

/// `TJ`: strings interleaved with adjustments in thousandths of text space.
fn show_array(
    elements: &[PdfValue],
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<Span>,
) {
    let (x, y) = (state.x(), state.y());
    let mut text = String::new();
    let mut advance = 0.0;

    for element in elements {
        if let Some(fragment) = decode(element, backend, page_id, state) {
            advance += state.advance_text(&fragment);
            text.push_str(&fragment);
        } else if let Some(adjust) = get_number_from_value(element) {
            let dx = -adjust / 1000.0 * state.font_size * state.horiz_scale;
            if dx > state.glyph_width() * TJ_SPACE_FRACTION && !text.ends_with(' ') {
                text.push(' ');
            }
            state.advance_x(dx);
            advance += dx;
        }
    }

    let trimmed = text.trim();
    if !trimmed.is_empty() {
        spans.push(state.span(trimmed.to_string(), x, y, advance));
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Walk a page's content stream and return every shown string.
///
/// Handles the text object, font, positioning, spacing and showing
/// operators (`BT`, `Tf`, `Tm`, `Td`, `TD`, `T*`, `TL`, `Tc`, `Tw`, `Tz`,
/// `Ts`, `Tj`, `TJ`, `'`, `"`). Graphics state transforms are ignored.
pub fn extract_page_spans(backend: &dyn PdfBackend, page_id: PageId) -> Result<Vec<Span>, PdfError> {
    let raw = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw)?;
    Ok(spans_from_ops(backend, page_id, &ops))
}

/// Like [`extract_page_spans`], over operations that are already decoded.
pub fn spans_from_ops(backend: &dyn PdfBackend, page_id: PageId, ops: &[ContentOp]) -> Vec<Span> {
    let fonts = backend.page_fonts(page_id).unwrap_or_default();

    let mut state = TextState::default();
    let mut spans = Vec::new();

    for op in ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "Tf" => set_font(operands, &fonts, &mut state),
            "Tm" => {
                let values: Vec<f32> = operands.iter().filter_map(get_number_from_value).collect();
                if let [a, b, c, d, e, f] = values[..] {
                    state.text_matrix = [a, b, c, d, e, f];
                    state.line_matrix = state.text_matrix;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => state.leading = number(operands, 0).unwrap_or(state.leading),
            "Tc" => state.char_spacing = number(operands, 0).unwrap_or(state.char_spacing),
            "Tw" => state.word_spacing = number(operands, 0).unwrap_or(state.word_spacing),
            "Tz" => {
                if let Some(scale) = number(operands, 0) {
                    state.horiz_scale = scale / 100.0;
                }
            }
            "Ts" => state.text_rise = number(operands, 0).unwrap_or(state.text_rise),
            "Tj" => {
                if let Some(first) = operands.first() {
                    show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(elements)) = operands.first() {
                    show_array(elements, backend, page_id, &mut state, &mut spans);
                }
            }
            "'" => {
                state.next_line();
                if let Some(first) = operands.first() {
                    show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "\"" => {
                if let [aw, ac, text] = operands {
                    if let Some(aw) = get_number_from_value(aw) {
                        state.word_spacing = aw;
                    }
                    if let Some(ac) = get_number_from_value(ac) {
                        state.char_spacing = ac;
                    }
                    state.next_line();
                    show_string(text, backend, page_id, &mut state, &mut spans);
                }
            }
            _ => {}
        }
    }

    spans
}

/// Group spans sharing a baseline into lines, top of the page first.
pub fn assemble_lines(mut spans: Vec<Span>) -> Vec<TextLine> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    for span in spans {
        if let Some(first) = current.first() {
            if (span.y - first.y).abs() > Y_TOLERANCE {
                lines.extend(build_line(std::mem::take(&mut current)));
            }
        }
        current.push(span);
    }
    lines.extend(build_line(current));
    lines
}

fn build_line(mut spans: Vec<Span>) -> Option<TextLine> {
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));
    let first = spans.first()?;
    let (x, y) = (first.x, first.y);

    let mut text = String::new();
    let mut prev_end: Option<f32> = None;
    for span in &spans {
        if let Some(end) = prev_end {
            if span.x - end >= MIN_WORD_GAP && !text.ends_with(' ') && !span.text.starts_with(' ') {
                text.push(' ');
            }
        }
        text.push_str(&span.text);
        prev_end = Some(span.x + span.width);
    }

    let dominant = dominant_span(&spans)?;
    Some(TextLine {
        text: text.split_whitespace().collect::<Vec<_>>().join(" "),
        x,
        y,
        font_size: dominant_font_size(&spans),
        font_name: dominant.font_name.clone(),
        is_bold: dominant.is_bold,
        is_italic: dominant.is_italic,
    })
}

/// Character-weighted size; ties go to the larger size.
fn dominant_font_size(spans: &[Span]) -> f32 {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for span in spans {
        let key = (span.font_size * 100.0).round() as i32;
        *counts.entry(key).or_default() += span.text.chars().count();
    }
    counts
        .into_iter()
        .max_by_key(|(_, chars)| *chars)
        .map(|(key, _)| key as f32 / 100.0)
        .unwrap_or(0.0)
}

/// The span style covering the most characters; ties go to the earliest.
fn dominant_span(spans: &[Span]) -> Option<&Span> {
    let mut chars: BTreeMap<(&str, bool, bool), usize> = BTreeMap::new();
    for span in spans {
        *chars
            .entry((span.font_name.as_str(), span.is_bold, span.is_italic))
            .or_default() += span.text.chars().count();
    }
    let best = chars.values().copied().max()?;
    spans.iter().find(|s| {
        chars.get(&(s.font_name.as_str(), s.is_bold, s.is_italic)) == Some(&best)
    })
}

/// Lines of one page.
pub fn page_text(backend: &dyn PdfBackend, page: u32, page_id: PageId) -> Result<PageText, PdfError> {
    let spans = extract_page_spans(backend, page_id)?;
    Ok(PageText {
        page,
        lines: assemble_lines(spans),
    })
}
