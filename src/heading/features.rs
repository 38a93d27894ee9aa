//! Typographic and linguistic features of a line.

use super::tokenizer::Tokenizer;
use crate::error::Result;
use crate::model::{Line, DEFAULT_FONT_SIZE};

/// Lines with fewer tokens than this count as short.
const SHORT_TOKEN_LIMIT: usize = 12;

/// Features the heading rules evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeatures {
    /// Size of the line's first span, or 12 without span data
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub span_count: usize,
    pub token_count: usize,
    pub capitalized_tokens: usize,
    /// Whitespace-separated words
    pub word_count: usize,
}

impl LineFeatures {
    /// Derive features from the line's first span and its tokens.
    pub fn extract(line: &Line, tokenizer: &dyn Tokenizer) -> Result<Self> {
        let tokens = tokenizer.tokenize(&line.text)?;
        let first = line.spans.first();

        Ok(Self {
            font_size: first.map(|s| s.size).unwrap_or(DEFAULT_FONT_SIZE),
            bold: first.is_some_and(|s| s.is_bold()),
            italic: first.is_some_and(|s| s.is_italic()),
            span_count: line.span_count(),
            token_count: tokens.len(),
            capitalized_tokens: tokens.iter().filter(|t| t.is_capitalized()).count(),
            word_count: line.word_count(),
        })
    }

    pub fn is_short(&self) -> bool {
        self.token_count < SHORT_TOKEN_LIMIT
    }

    /// More than half of the tokens start with an uppercase letter.
    pub fn is_title_cased(&self) -> bool {
        self.capitalized_tokens * 2 > self.token_count
    }

    /// Share of capitalized tokens, 0 for an empty line.
    pub fn uppercase_ratio(&self) -> f32 {
        if self.token_count == 0 {
            0.0
        } else {
            self.capitalized_tokens as f32 / self.token_count as f32
        }
    }
}
