//! Data model shared by the block provider and the outline engine.
//!
//! Blocks and spans are the input side (what a PDF backend yields per page);
//! lines are the intermediate unit the classifier works on; heading
//! candidates and the extraction result are the output side.

mod block;
mod line;
mod outline;

pub use block::{BBox, Block, BlockKind, Span, SpanFlags, DEFAULT_FONT_SIZE};
pub use line::{is_toc_header, Line};
pub use outline::{ExtractionResult, HeadingCandidate, HeadingLevel, UNTITLED};
