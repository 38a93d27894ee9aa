//! # pdfoutline
//!
//! Title and heading outline extraction for PDF documents.
//!
//! Positioned text blocks are read from each page, grouped into lines, and
//! classified as H1/H2/H3 headings by an ordered set of typographic and
//! linguistic rules. Numbered entries under a "Table of Contents" header are
//! kept out of the outline.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_file, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let result = extract_file("document.pdf")?;
//!
//!     println!("{}", render::to_json(&result, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Title detection**: bold and large text on the first page
//! - **Three heading levels**: font size buckets plus numbering overrides
//! - **TOC suppression**: per-page, closed by a real heading or after 5 entries
//! - **Pluggable input**: any [`BlockProvider`], with lopdf as the default
//! - **Pluggable tokenizer**: any [`Tokenizer`] for the linguistic features

pub mod detect;
pub mod error;
pub mod extractor;
pub mod heading;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{has_pdf_extension, sniff_bytes, sniff_file, PdfHeader};
pub use error::{Error, Result};
pub use extractor::OutlineExtractor;
pub use heading::{clean_title, Tokenizer, UnicodeTokenizer};
pub use model::{Block, ExtractionResult, HeadingCandidate, HeadingLevel, Span};
pub use parser::{BlockProvider, ErrorMode, ExtractOptions, LopdfBackend, MemoryProvider};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Extract the title and outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_file;
///
/// let result = extract_file("document.pdf").unwrap();
/// for heading in &result.outline {
///     println!("{} {} (p. {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    OutlineExtractor::new().extract_file(path)
}

/// Extract with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{extract_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new().strict();
/// let result = extract_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<ExtractionResult> {
    OutlineExtractor::new()
        .with_options(options)
        .extract_file(path)
}

/// Extract from PDF bytes.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let result = extract_bytes(&data).unwrap();
/// ```
pub fn extract_bytes(data: &[u8]) -> Result<ExtractionResult> {
    OutlineExtractor::new().extract_bytes(data)
}

/// Extract from a reader.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_reader;
/// use std::fs::File;
///
/// let file = File::open("document.pdf").unwrap();
/// let result = extract_reader(file).unwrap();
/// ```
pub fn extract_reader<R: Read>(reader: R) -> Result<ExtractionResult> {
    OutlineExtractor::new().extract_reader(reader)
}

/// Extract a PDF file straight to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let result = extract_file(path)?;
    render::to_json(&result, format)
}
