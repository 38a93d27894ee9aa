//! In-memory block provider.

use super::backend::BlockProvider;
use crate::error::{Error, Result};
use crate::model::Block;

#[derive(Debug, Clone)]
enum MemoryPage {
    Ready { width: f32, blocks: Vec<Block> },
    Broken(String),
}

/// A [`BlockProvider`] over pre-built pages.
///
/// Used to drive the outline engine from another layout engine's output,
/// and to test classification without producing PDF bytes.
///
/// # Example
///
/// ```
/// use pdfoutline::model::{BBox, Block, Span};
/// use pdfoutline::parser::{BlockProvider, MemoryProvider};
///
/// let provider = MemoryProvider::new().with_page(
///     612.0,
///     vec![Block::text(
///         BBox::new(72.0, 72.0, 300.0, 96.0),
///         "Annual Report",
///         vec![Span::new("Annual Report", "Helvetica-Bold", 24.0)],
///     )],
/// );
/// assert_eq!(provider.page_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    pages: Vec<MemoryPage>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page and return the provider.
    pub fn with_page(mut self, width: f32, blocks: Vec<Block>) -> Self {
        self.push_page(width, blocks);
        self
    }

    /// Append a page whose block retrieval fails with the given message.
    pub fn with_broken_page(mut self, message: impl Into<String>) -> Self {
        self.pages.push(MemoryPage::Broken(message.into()));
        self
    }

    /// Append a page.
    pub fn push_page(&mut self, width: f32, blocks: Vec<Block>) {
        self.pages.push(MemoryPage::Ready { width, blocks });
    }

    fn page(&self, page: u32) -> Result<&MemoryPage> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }
}

impl BlockProvider for MemoryProvider {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_width(&self, page: u32) -> Result<f32> {
        match self.page(page)? {
            MemoryPage::Ready { width, .. } => Ok(*width),
            MemoryPage::Broken(msg) => Err(Error::PdfParse(msg.clone())),
        }
    }

    fn page_blocks(&self, page: u32) -> Result<Vec<Block>> {
        match self.page(page)? {
            MemoryPage::Ready { blocks, .. } => Ok(blocks.clone()),
            MemoryPage::Broken(msg) => Err(Error::PdfParse(msg.clone())),
        }
    }
}
