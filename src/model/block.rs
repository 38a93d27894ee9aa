//! Positioned blocks and styled spans, as yielded by a block provider.

use bitflags::bitflags;

/// Font size assumed when a block carries no span data.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Axis-aligned bounding box in page space.
///
/// The origin is the top-left corner of the page and `y` grows downward,
/// so `y0` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Discriminates text blocks from everything else (images, drawings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Text,
    Image,
}

bitflags! {
    /// Style bits of a span.
    ///
    /// Bit positions follow the common span-flag layout used by PDF text
    /// extractors (italic = 2, bold = 16).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SpanFlags: u32 {
        const SUPERSCRIPT = 1;
        const ITALIC = 1 << 1;
        const SERIF = 1 << 2;
        const MONOSPACE = 1 << 3;
        const BOLD = 1 << 4;
    }
}

/// A styled run of text within a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Font name (e.g., "Helvetica-Bold")
    pub font: String,
    /// Font size in points
    pub size: f32,
    /// Style flag bits
    pub flags: SpanFlags,
    /// Text of the run
    pub text: String,
}

impl Span {
    /// Create a span with no style flags.
    pub fn new(text: impl Into<String>, font: impl Into<String>, size: f32) -> Self {
        Self {
            font: font.into(),
            size,
            flags: SpanFlags::empty(),
            text: text.into(),
        }
    }

    /// Replace the style flags.
    pub fn with_flags(mut self, flags: SpanFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Bold by flag bit or by font name.
    pub fn is_bold(&self) -> bool {
        self.flags.contains(SpanFlags::BOLD) || self.font.to_lowercase().contains("bold")
    }

    /// Italic by flag bit or by font name.
    pub fn is_italic(&self) -> bool {
        self.flags.contains(SpanFlags::ITALIC) || self.font.to_lowercase().contains("italic")
    }
}

/// A positioned chunk of page content.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub bbox: BBox,
    /// Raw text; may contain newlines between the block's visual lines
    pub text: String,
    pub kind: BlockKind,
    /// Spans of the block's first visual line, in reading order
    pub spans: Vec<Span>,
}

impl Block {
    /// Create a text block.
    pub fn text(bbox: BBox, text: impl Into<String>, spans: Vec<Span>) -> Self {
        Self {
            bbox,
            text: text.into(),
            kind: BlockKind::Text,
            spans,
        }
    }

    /// Create a non-text block (image, drawing).
    pub fn image(bbox: BBox) -> Self {
        Self {
            bbox,
            text: String::new(),
            kind: BlockKind::Image,
            spans: Vec::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == BlockKind::Text
    }

    /// First span, if the block carries span data.
    pub fn first_span(&self) -> Option<&Span> {
        self.spans.first()
    }

    /// Representative font size: the first span's size, or 12.
    pub fn font_size(&self) -> f32 {
        self.first_span().map(|s| s.size).unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Largest span font size, or `None` without span data.
    pub fn max_span_size(&self) -> Option<f32> {
        self.spans.iter().map(|s| s.size).reduce(f32::max)
    }

    /// Block text with its line breaks flattened and the ends trimmed.
    pub fn flat_text(&self) -> String {
        self.text.trim().replace('\n', " ")
    }

    /// Number of whitespace-separated words in the raw text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_style_from_flags_or_name() {
        let plain = Span::new("Body", "Times-Roman", 11.0);
        assert!(!plain.is_bold());
        assert!(!plain.is_italic());

        let by_name = Span::new("Head", "Arial-BoldItalicMT", 14.0);
        assert!(by_name.is_bold());
        assert!(by_name.is_italic());

        let by_flag = Span::new("Head", "F1", 14.0).with_flags(SpanFlags::BOLD);
        assert!(by_flag.is_bold());
        assert!(!by_flag.is_italic());
    }

    #[test]
    fn test_flag_bits() {
        assert_eq!(SpanFlags::BOLD.bits(), 16);
        assert_eq!(SpanFlags::ITALIC.bits(), 2);
    }

    #[test]
    fn test_block_defaults_without_spans() {
        let block = Block::text(BBox::new(0.0, 0.0, 10.0, 10.0), "x", vec![]);
        assert_eq!(block.font_size(), DEFAULT_FONT_SIZE);
        assert_eq!(block.max_span_size(), None);
        assert!(block.first_span().is_none());
    }

    #[test]
    fn test_block_text_helpers() {
        let block = Block::text(BBox::default(), "  Annual\nReport  ", vec![]);
        assert_eq!(block.flat_text(), "Annual Report");
        assert_eq!(block.word_count(), 2);
        assert!(block.is_text());
        assert!(!Block::image(BBox::default()).is_text());
    }

    #[test]
    fn test_max_span_size() {
        let block = Block::text(
            BBox::default(),
            "A B",
            vec![Span::new("A", "F", 10.0), Span::new("B", "F", 14.5)],
        );
        assert_eq!(block.max_span_size(), Some(14.5));
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 20.0, 30.0, 40.0);
        let b = BBox::new(5.0, 25.0, 50.0, 35.0);
        assert_eq!(a.union(&b), BBox::new(5.0, 20.0, 50.0, 40.0));
        assert_eq!(a.width(), 20.0);
        assert_eq!(a.height(), 20.0);
    }
}
