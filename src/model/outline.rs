//! Output types: heading candidates and the per-document result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when no usable title text exists.
pub const UNTITLED: &str = "Untitled";

/// Heading level of an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Numeric depth (1 for H1).
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingLevel::H1 => write!(f, "H1"),
            HeadingLevel::H2 => write!(f, "H2"),
            HeadingLevel::H3 => write!(f, "H3"),
        }
    }
}

/// An accepted heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    pub level: HeadingLevel,
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

impl HeadingCandidate {
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Title and outline of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub outline: Vec<HeadingCandidate>,
}

impl ExtractionResult {
    /// An "Untitled" result with no outline.
    pub fn empty() -> Self {
        Self {
            title: UNTITLED.to_string(),
            outline: Vec::new(),
        }
    }

    /// True when there is neither a real title nor any heading.
    ///
    /// Batch callers skip writing output for such documents.
    pub fn is_empty(&self) -> bool {
        self.title == UNTITLED && self.outline.is_empty()
    }

    /// Count of headings at the given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.outline.iter().filter(|h| h.level == level).count()
    }
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::empty()
    }
}
