//! Layout analysis for PDF pages.
//!
//! Interprets a page content stream into positioned text runs, then groups
//! the runs into blocks: one block per paragraph-like stack of visual lines
//! sharing left edge and style, split horizontally at wide gaps.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::{BBox, Block, Span, SpanFlags};

/// Ascender share of the font size used to place a run's top edge.
const ASCENT: f32 = 0.8;
/// Descender share of the font size used to place a run's bottom edge.
const DESCENT: f32 = 0.2;
/// Glyph width (1/1000 em) assumed when a font carries no /Widths.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;
/// TJ adjustments beyond this (1/1000 em) are read as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text run in PDF user space (origin bottom-left, y up).
#[derive(Debug, Clone)]
pub(crate) struct RawSpan {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
    pub size: f32,
    pub font: String,
    pub flags: SpanFlags,
}

/// 2D affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
        (n.len() == 6).then(|| Matrix::new(n[0], n[1], n[2], n[3], n[4], n[5]))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Style and metrics of one page font resource.
#[derive(Debug, Clone)]
struct FontInfo {
    base_font: String,
    flags: SpanFlags,
    first_char: i64,
    widths: Vec<f32>,
    two_byte: bool,
}

impl FontInfo {
    fn unknown(name: &[u8]) -> Self {
        let base_font = String::from_utf8_lossy(name).to_string();
        Self {
            flags: flags_from_name(&base_font),
            base_font,
            first_char: 0,
            widths: Vec::new(),
            two_byte: false,
        }
    }

    /// Advance of a string in 1/1000 em, with its glyph and space counts.
    fn measure(&self, bytes: &[u8]) -> (f32, usize, usize) {
        if self.two_byte {
            let glyphs = bytes.len() / 2;
            return (glyphs as f32 * DEFAULT_GLYPH_WIDTH, glyphs, 0);
        }
        let mut total = 0.0;
        let mut spaces = 0;
        for &code in bytes {
            if code == b' ' {
                spaces += 1;
            }
            let idx = code as i64 - self.first_char;
            let w = if idx >= 0 {
                self.widths.get(idx as usize).copied()
            } else {
                None
            };
            total += w.filter(|w| *w > 0.0).unwrap_or(DEFAULT_GLYPH_WIDTH);
        }
        (total, bytes.len(), spaces)
    }
}

/// Text state carried across operators inside and between BT/ET.
#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    leading: f32,
    matrix: Matrix,
    line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).concat(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).concat(&self.matrix);
    }
}

/// Content-stream interpreter for one page.
pub(crate) struct PageInterpreter<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: HashMap<Vec<u8>, FontInfo>,
    normalize: bool,
}

impl<'a> PageInterpreter<'a> {
    pub fn new(
        doc: &'a LopdfDocument,
        fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
        normalize: bool,
    ) -> Self {
        let metrics = fonts
            .iter()
            .map(|(name, dict)| (name.clone(), font_info(doc, dict)))
            .collect();
        Self {
            doc,
            fonts,
            metrics,
            normalize,
        }
    }

    /// Run the content stream, returning text runs and XObject placements.
    pub fn run(&self, content: &[u8]) -> Result<(Vec<RawSpan>, Vec<(f32, f32, f32, f32)>)> {
        let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut xobjects = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut ts = TextState::default();
        let mut in_text = false;

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => {
                    if let Some(saved) = ctm_stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        ctm = m.concat(&ctm);
                    }
                }
                "BT" => {
                    in_text = true;
                    ts.matrix = Matrix::IDENTITY;
                    ts.line_matrix = Matrix::IDENTITY;
                }
                "ET" => in_text = false,
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            ts.font_key = name.clone();
                        }
                        ts.font_size = get_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "Tc" => ts.char_spacing = operands.first().and_then(get_number).unwrap_or(0.0),
                "Tw" => ts.word_spacing = operands.first().and_then(get_number).unwrap_or(0.0),
                "TL" => ts.leading = operands.first().and_then(get_number).unwrap_or(0.0),
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            ts.leading = -ty;
                        }
                        ts.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        ts.matrix = m;
                        ts.line_matrix = m;
                    }
                }
                "T*" => ts.next_line(),
                "Tj" if in_text => {
                    if let Some(obj @ Object::String(..)) = operands.first() {
                        self.show(&mut ts, &ctm, std::slice::from_ref(obj), &mut spans);
                    }
                }
                "TJ" if in_text => {
                    if let Some(Object::Array(items)) = operands.first() {
                        self.show(&mut ts, &ctm, items, &mut spans);
                    }
                }
                "'" | "\"" => {
                    ts.next_line();
                    let text_idx = if op.operator == "\"" {
                        if operands.len() >= 3 {
                            ts.word_spacing = get_number(&operands[0]).unwrap_or(0.0);
                            ts.char_spacing = get_number(&operands[1]).unwrap_or(0.0);
                        }
                        2
                    } else {
                        0
                    };
                    if in_text {
                        if let Some(obj @ Object::String(..)) = operands.get(text_idx) {
                            self.show(&mut ts, &ctm, std::slice::from_ref(obj), &mut spans);
                        }
                    }
                }
                "Do" => {
                    // Unit square mapped through the CTM
                    let (x0, y0) = ctm.apply(0.0, 0.0);
                    let (x1, y1) = ctm.apply(1.0, 1.0);
                    xobjects.push((x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)));
                }
                _ => {}
            }
        }

        Ok((spans, xobjects))
    }

    /// Show a TJ-style array of strings and kerning numbers as one run.
    fn show(&self, ts: &mut TextState, ctm: &Matrix, items: &[Object], out: &mut Vec<RawSpan>) {
        let unknown;
        let info = match self.metrics.get(&ts.font_key) {
            Some(info) => info,
            None => {
                unknown = FontInfo::unknown(&ts.font_key);
                &unknown
            }
        };

        let start = ts.matrix.concat(ctm);
        let mut text = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    text.push_str(&self.decode(&ts.font_key, bytes));
                    let (units, glyphs, spaces) = info.measure(bytes);
                    advance += units / 1000.0 * ts.font_size
                        + ts.char_spacing * glyphs as f32
                        + ts.word_spacing * spaces as f32;
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = get_number(item).unwrap_or(0.0);
                    advance -= adjustment / 1000.0 * ts.font_size;
                    if -adjustment > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(' ')
                        && !text.ends_with('\u{00A0}')
                        && !text.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }

        ts.advance(advance);

        if text.trim().is_empty() {
            return;
        }
        let text = if self.normalize {
            text.nfkc().collect()
        } else {
            text
        };

        let (x, baseline) = start.apply(0.0, 0.0);
        out.push(RawSpan {
            text,
            x,
            baseline,
            width: advance * start.horizontal_scale(),
            size: ts.font_size * start.vertical_scale(),
            font: info.base_font.clone(),
            flags: info.flags,
        });
    }

    fn decode(&self, font_key: &[u8], bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(font_key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());
        match encoding {
            Some(enc) => LopdfDocument::decode_text(&enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }
}

/// Read base font name, style flags and widths from a font dictionary.
fn font_info(doc: &LopdfDocument, font: &Dictionary) -> FontInfo {
    let raw_name = font
        .get(b"BaseFont")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    // Drop the subset tag, e.g. "ABCDEF+Arial-BoldMT"
    let base_font = match raw_name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 => rest.to_string(),
        _ => raw_name,
    };

    let mut flags = flags_from_name(&base_font);
    if let Some(descriptor) = font
        .get(b"FontDescriptor")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
    {
        let bits = descriptor
            .get(b"Flags")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        if bits & 1 != 0 {
            flags |= SpanFlags::MONOSPACE;
        }
        if bits & (1 << 1) != 0 {
            flags |= SpanFlags::SERIF;
        }
        if bits & (1 << 6) != 0 {
            flags |= SpanFlags::ITALIC;
        }
        if bits & (1 << 18) != 0 {
            flags |= SpanFlags::BOLD;
        }
        let weight = descriptor
            .get(b"FontWeight")
            .ok()
            .and_then(get_number)
            .unwrap_or(0.0);
        if weight >= 700.0 {
            flags |= SpanFlags::BOLD;
        }
    }

    let two_byte = font
        .get(b"Subtype")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| n == b"Type0")
        .unwrap_or(false);
    let first_char = font
        .get(b"FirstChar")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0);
    let widths = font
        .get(b"Widths")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|arr| {
            arr.iter()
                .map(|w| resolve(doc, w).and_then(get_number).unwrap_or(0.0))
                .collect()
        })
        .unwrap_or_default();

    FontInfo {
        base_font,
        flags,
        first_char,
        widths,
        two_byte,
    }
}

fn flags_from_name(name: &str) -> SpanFlags {
    let lower = name.to_lowercase();
    let mut flags = SpanFlags::empty();
    if ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|w| lower.contains(w))
    {
        flags |= SpanFlags::BOLD;
    }
    if lower.contains("italic") || lower.contains("oblique") {
        flags |= SpanFlags::ITALIC;
    }
    if lower.contains("courier") || lower.contains("mono") {
        flags |= SpanFlags::MONOSPACE;
    }
    flags
}

/// Follow one level of indirection.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// A run placed in page space (origin top-left, y down).
#[derive(Debug, Clone)]
struct Placed {
    text: String,
    bbox: BBox,
    baseline: f32,
    size: f32,
    font: String,
    flags: SpanFlags,
}

/// One horizontal segment of a visual line.
#[derive(Debug, Clone)]
struct Segment {
    text: String,
    bbox: BBox,
    spans: Vec<Span>,
}

impl Segment {
    fn style(&self) -> Option<(&str, f32, SpanFlags)> {
        self.spans
            .first()
            .map(|s| (s.font.as_str(), s.size, s.flags))
    }
}

/// Group raw runs and XObject placements into page-space blocks.
///
/// `media` is the page's MediaBox in user space.
pub(crate) fn build_blocks(
    spans: Vec<RawSpan>,
    xobjects: &[(f32, f32, f32, f32)],
    media: BBox,
) -> Vec<Block> {
    let mut placed: Vec<Placed> = spans
        .into_iter()
        .map(|s| {
            let top = media.y1 - (s.baseline + s.size * ASCENT);
            let bottom = media.y1 - (s.baseline - s.size * DESCENT);
            let x0 = s.x - media.x0;
            Placed {
                bbox: BBox::new(x0, top, x0 + s.width.max(0.0), bottom),
                baseline: media.y1 - s.baseline,
                text: s.text,
                size: s.size,
                font: s.font,
                flags: s.flags,
            }
        })
        .collect();

    placed.sort_by(|a, b| {
        cmp_f32(a.baseline, b.baseline).then_with(|| cmp_f32(a.bbox.x0, b.bbox.x0))
    });

    let mut segments = Vec::new();
    for line in split_visual_lines(placed) {
        segments.extend(split_segments(line));
    }

    let mut blocks = merge_paragraphs(segments);
    blocks.extend(xobjects.iter().map(|&(x0, y0, x1, y1)| {
        Block::image(BBox::new(
            x0 - media.x0,
            media.y1 - y1,
            x1 - media.x0,
            media.y1 - y0,
        ))
    }));

    blocks.sort_by(|a, b| cmp_f32(a.bbox.y0, b.bbox.y0).then_with(|| cmp_f32(a.bbox.x0, b.bbox.x0)));
    blocks
}

/// Runs whose baselines differ by at most 30% of the font size share a line.
fn split_visual_lines(placed: Vec<Placed>) -> Vec<Vec<Placed>> {
    let mut lines: Vec<Vec<Placed>> = Vec::new();
    let mut current: Vec<Placed> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in placed {
        let tolerance = span.size * 0.3;
        match current_y {
            Some(y) if (span.baseline - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(span.baseline);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| cmp_f32(a.bbox.x0, b.bbox.x0));
    }
    lines
}

/// Break a visual line at gaps wider than twice the font size.
fn split_segments(line: Vec<Placed>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<Segment> = None;
    let mut prev: Option<Placed> = None;

    for span in line {
        let gap = prev
            .as_ref()
            .map(|p| (span.bbox.x0 - p.bbox.x1, p.size.max(span.size)));

        match (current.as_mut(), gap) {
            (Some(seg), Some((gap, size))) if gap <= size * 2.0 => {
                let prev_text = prev.as_ref().map(|p| p.text.as_str()).unwrap_or("");
                let join_space = needs_space(prev_text, &span.text, gap, size);
                append_run(seg, &span, join_space);
            }
            _ => {
                if let Some(seg) = current.take() {
                    segments.push(seg);
                }
                current = Some(Segment {
                    text: String::new(),
                    bbox: span.bbox,
                    spans: Vec::new(),
                });
                if let Some(seg) = current.as_mut() {
                    append_run(seg, &span, false);
                }
            }
        }
        prev = Some(span);
    }
    if let Some(seg) = current {
        segments.push(seg);
    }

    for seg in &mut segments {
        seg.text = seg.text.trim().to_string();
    }
    segments
}

fn needs_space(prev: &str, next: &str, gap: f32, size: f32) -> bool {
    if gap <= size * 0.15 {
        return false;
    }
    let prev_ws = prev.ends_with(' ') || prev.ends_with('\u{00A0}');
    let next_ws = next.starts_with(' ') || next.starts_with('\u{00A0}');
    let both_cjk = prev.chars().last().is_some_and(is_spaceless_script_char)
        && next.chars().next().is_some_and(is_spaceless_script_char);
    !prev_ws && !next_ws && !both_cjk
}

/// Add a run to a segment, merging it into the last span when the style matches.
fn append_run(seg: &mut Segment, run: &Placed, join_space: bool) {
    if join_space {
        seg.text.push(' ');
    }
    seg.text.push_str(&run.text);
    seg.bbox = seg.bbox.union(&run.bbox);

    match seg.spans.last_mut() {
        Some(last)
            if last.font == run.font
                && (last.size - run.size).abs() < 0.01
                && last.flags == run.flags =>
        {
            if join_space {
                last.text.push(' ');
            }
            last.text.push_str(&run.text);
        }
        _ => seg.spans.push(
            Span::new(run.text.clone(), run.font.clone(), run.size).with_flags(run.flags),
        ),
    }
}

/// Stack consecutive segments with the same left edge and style into one block.
fn merge_paragraphs(mut segments: Vec<Segment>) -> Vec<Block> {
    segments.sort_by(|a, b| cmp_f32(a.bbox.y0, b.bbox.y0).then_with(|| cmp_f32(a.bbox.x0, b.bbox.x0)));

    // (block, style and bottom edge of its last segment)
    let mut open: Vec<(Block, Segment)> = Vec::new();

    for seg in segments {
        if seg.text.is_empty() {
            continue;
        }
        let target = open.iter_mut().rev().find(|(block, last)| {
            let (Some(style), Some(last_style)) = (seg.style(), last.style()) else {
                return false;
            };
            let size = style.1;
            let gap = seg.bbox.y0 - last.bbox.y1;
            style.0 == last_style.0
                && (style.1 - last_style.1).abs() < 0.01
                && style.2 == last_style.2
                && (seg.bbox.x0 - block.bbox.x0).abs() <= 2.0
                && (-size * 0.3..=size * 0.6).contains(&gap)
        });

        match target {
            Some((block, last)) => {
                block.text.push('\n');
                block.text.push_str(&seg.text);
                block.bbox = block.bbox.union(&seg.bbox);
                *last = seg;
            }
            None => {
                let block = Block::text(seg.bbox, seg.text.clone(), seg.spans.clone());
                open.push((block, seg));
            }
        }
    }

    open.into_iter().map(|(block, _)| block).collect()
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
