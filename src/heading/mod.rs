//! Title and heading classification engine.
//!
//! Blocks from a [`BlockProvider`](crate::parser::BlockProvider) are grouped
//! into lines, measured, and run through an ordered rule table. Page 1 only
//! feeds title detection; later pages feed the outline.

mod assembler;
mod features;
mod grouper;
mod rules;
mod title;
mod toc;
mod tokenizer;

pub use assembler::OutlineBuilder;
pub use features::LineFeatures;
pub use grouper::group_lines;
pub use rules::{
    classify, is_numbered, is_toc_entry, Classification, GateRule, LevelRule, LineContext,
    RejectReason, GATE_RULES, LEVEL_RULES,
};
pub use title::{clean_title, detect_title};
pub use toc::{TocState, TocTracker, TOC_ENTRY_LIMIT};
pub use tokenizer::{Token, Tokenizer, UnicodeTokenizer};
