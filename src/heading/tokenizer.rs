//! Linguistic tokenizer capability.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;

/// One token of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Leading character of the token.
    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// Whether the token starts with an uppercase letter.
    pub fn is_capitalized(&self) -> bool {
        self.first_char().is_some_and(char::is_uppercase)
    }
}

/// Splits text into tokens for capitalization and length features.
///
/// Implementations must be deterministic; extraction output depends on
/// the token count.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;
}

/// Tokenizer based on Unicode word boundaries (UAX #29).
///
/// Words, numbers and each punctuation mark become tokens; whitespace is
/// dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeTokenizer;

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        Ok(text
            .split_word_bounds()
            .filter(|s| !s.trim().is_empty())
            .map(Token::new)
            .collect())
    }
}
