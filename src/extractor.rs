//! Document-level extraction driver.

use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::heading::{detect_title, group_lines, OutlineBuilder, Tokenizer, UnicodeTokenizer};
use crate::model::{ExtractionResult, UNTITLED};
use crate::parser::{BlockProvider, ErrorMode, ExtractOptions, LopdfBackend};

/// Extracts the title and outline of documents.
///
/// Pages are processed strictly in order. Page 1 only yields the title; every
/// later page is grouped into lines and classified.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{ExtractOptions, OutlineExtractor};
///
/// let extractor = OutlineExtractor::new().with_options(ExtractOptions::new().strict());
/// let result = extractor.extract_file("report.pdf").unwrap();
/// println!("{}: {} headings", result.title, result.outline.len());
/// ```
pub struct OutlineExtractor {
    options: ExtractOptions,
    tokenizer: Box<dyn Tokenizer>,
}

impl OutlineExtractor {
    /// Create an extractor with default options and the Unicode tokenizer.
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
            tokenizer: Box::new(UnicodeTokenizer),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the tokenizer used for linguistic features.
    pub fn with_tokenizer<T: Tokenizer + 'static>(mut self, tokenizer: T) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Open and extract a PDF file.
    ///
    /// An open failure is logged and returned; callers processing a batch
    /// skip the document.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionResult> {
        let path = path.as_ref();
        let backend = LopdfBackend::load_file(path)
            .map_err(|e| {
                log::error!("Failed to open PDF {}: {}", path.display(), e);
                e
            })?
            .with_normalize_unicode(self.options.normalize_unicode);
        self.extract(&backend)
    }

    /// Extract a PDF held in memory.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<ExtractionResult> {
        let backend = LopdfBackend::load_bytes(data)
            .map_err(|e| {
                log::error!("Failed to open PDF from memory: {}", e);
                e
            })?
            .with_normalize_unicode(self.options.normalize_unicode);
        self.extract(&backend)
    }

    /// Extract a PDF read from a reader.
    pub fn extract_reader<R: Read>(&self, mut reader: R) -> Result<ExtractionResult> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.extract_bytes(&data)
    }

    /// Extract from any block provider.
    pub fn extract(&self, provider: &dyn BlockProvider) -> Result<ExtractionResult> {
        let mut title: Option<String> = None;
        let mut builder = OutlineBuilder::new();

        for page in 1..=provider.page_count() {
            if let Err(e) = self.process_page(provider, page, &mut title, &mut builder) {
                match self.options.error_mode {
                    ErrorMode::Strict => return Err(e),
                    ErrorMode::Lenient => {
                        log::warn!("Error processing page {}: {}", page, e);
                    }
                }
            }
        }

        let result = ExtractionResult {
            title: title.unwrap_or_else(|| UNTITLED.to_string()),
            outline: builder.finish(),
        };
        log::info!(
            "Extracted {:?} with {} headings from {} pages",
            result.title,
            result.outline.len(),
            provider.page_count()
        );
        Ok(result)
    }

    fn process_page(
        &self,
        provider: &dyn BlockProvider,
        page: u32,
        title: &mut Option<String>,
        builder: &mut OutlineBuilder,
    ) -> Result<()> {
        let blocks = provider.page_blocks(page)?;
        if blocks.is_empty() {
            return Ok(());
        }

        if page == 1 {
            let detected = detect_title(&blocks);
            log::debug!("title: {:?}", detected);
            *title = Some(detected);
            return Ok(());
        }

        let width = provider.page_width(page)?;
        for line in group_lines(page, &blocks) {
            if let Err(e) = builder.process_line(&line, width, self.tokenizer.as_ref()) {
                match self.options.error_mode {
                    ErrorMode::Strict => return Err(e),
                    ErrorMode::Lenient => {
                        log::warn!("Error processing line on page {}: {}", page, e);
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::heading::Token;
    use crate::model::{BBox, Block, HeadingLevel, Span, SpanFlags};
    use crate::parser::MemoryProvider;

    fn heading(text: &str, y: f32, size: f32) -> Block {
        Block::text(
            BBox::new(72.0, y, 300.0, y + size),
            text,
            vec![Span::new(text, "Helvetica-Bold", size).with_flags(SpanFlags::BOLD)],
        )
    }

    #[test]
    fn test_title_page_not_classified() {
        let provider = MemoryProvider::new()
            .with_page(612.0, vec![heading("Annual Report 2024", 72.0, 20.0)])
            .with_page(612.0, vec![heading("1. Introduction", 72.0, 19.0)]);

        let result = OutlineExtractor::new().extract(&provider).unwrap();
        assert_eq!(result.title, "Annual Report 2024");
        assert_eq!(result.outline.len(), 1);
        assert_eq!(result.outline[0].page, 2);
    }

    #[test]
    fn test_empty_first_page_leaves_untitled() {
        let provider = MemoryProvider::new()
            .with_page(612.0, vec![])
            .with_page(612.0, vec![heading("Scope", 72.0, 14.0)]);

        let result = OutlineExtractor::new().extract(&provider).unwrap();
        assert_eq!(result.title, "Untitled");
        assert_eq!(result.outline[0].level, HeadingLevel::H1);
    }

    #[test]
    fn test_broken_page_skipped_when_lenient() {
        let provider = MemoryProvider::new()
            .with_page(612.0, vec![heading("Annual Report", 72.0, 20.0)])
            .with_broken_page("corrupt stream")
            .with_page(612.0, vec![heading("Findings", 72.0, 14.0)]);

        let result = OutlineExtractor::new().extract(&provider).unwrap();
        assert_eq!(result.outline.len(), 1);
        assert_eq!(result.outline[0].page, 3);

        let strict = OutlineExtractor::new().with_options(ExtractOptions::new().strict());
        assert!(matches!(strict.extract(&provider), Err(Error::PdfParse(_))));
    }

    struct Picky;

    impl Tokenizer for Picky {
        fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
            if text.contains("bad") {
                return Err(Error::Tokenize("unsupported text".to_string()));
            }
            UnicodeTokenizer.tokenize(text)
        }
    }

    #[test]
    fn test_line_errors_skip_the_line() {
        let provider = MemoryProvider::new().with_page(612.0, vec![]).with_page(
            612.0,
            vec![heading("bad line", 72.0, 14.0), heading("Good Line", 120.0, 14.0)],
        );

        let result = OutlineExtractor::new()
            .with_tokenizer(Picky)
            .extract(&provider)
            .unwrap();
        assert_eq!(result.outline.len(), 1);
        assert_eq!(result.outline[0].text, "Good Line");
        assert_eq!(result.outline[0].level, HeadingLevel::H1);
    }

    #[test]
    fn test_extract_bytes_rejects_garbage() {
        let err = OutlineExtractor::new().extract_bytes(b"not a pdf").unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }
}
