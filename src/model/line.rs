//! Logical text lines formed from same-height blocks.

use super::Span;

/// A logical row of text on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Block texts joined with single spaces, trimmed
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Top y-coordinate rounded to one decimal place
    pub y: f32,
    /// Left edge of the first contributing block
    pub x0: f32,
    /// Spans of the first contributing block
    pub spans: Vec<Span>,
}

impl Line {
    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of style spans in the first contributing block.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Whether the line is the literal "Table of Contents" header.
    pub fn is_toc_header(&self) -> bool {
        is_toc_header(&self.text)
    }
}

/// Case-insensitive, whitespace-trimmed match against "table of contents".
pub fn is_toc_header(text: &str) -> bool {
    text.trim().to_lowercase() == "table of contents"
}
