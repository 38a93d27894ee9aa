//! Accumulates accepted headings in document order.

use super::features::LineFeatures;
use super::rules::{classify, Classification, LineContext, RejectReason, COMPACT_WORD_LIMIT};
use super::toc::TocTracker;
use super::tokenizer::Tokenizer;
use crate::error::Result;
use crate::model::{HeadingCandidate, HeadingLevel, Line};

/// Builds the outline of one document, line by line.
///
/// Lines must be fed in page order and, within a page, top to bottom: the
/// first accepted heading becomes H1 and TOC state depends on line order.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    outline: Vec<HeadingCandidate>,
    toc: TocTracker,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one line and record it if accepted.
    ///
    /// Returns the assigned level, or `None` for lines that are not headings.
    pub fn process_line(
        &mut self,
        line: &Line,
        page_width: f32,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Option<HeadingLevel>> {
        if line.is_toc_header() {
            self.toc.begin(line.page);
            return Ok(None);
        }

        let features = LineFeatures::extract(line, tokenizer)?;
        let ctx = LineContext {
            line,
            features: &features,
            page_width,
            toc_active: self.toc.is_active(line.page),
            has_headings: !self.outline.is_empty(),
        };

        match classify(&ctx) {
            Classification::Rejected(RejectReason::TocEntry) => {
                if features.word_count < COMPACT_WORD_LIMIT {
                    self.toc.record_suppressed(line.page);
                }
                Ok(None)
            }
            Classification::Rejected(_) => Ok(None),
            Classification::Heading(level) => {
                if level == HeadingLevel::H1 {
                    self.toc.close(line.page);
                }
                self.outline
                    .push(HeadingCandidate::new(level, line.text.clone(), line.page));
                Ok(Some(level))
            }
        }
    }

    pub fn has_headings(&self) -> bool {
        !self.outline.is_empty()
    }

    /// Headings accepted so far.
    pub fn outline(&self) -> &[HeadingCandidate] {
        &self.outline
    }

    /// Per-page TOC state.
    pub fn toc(&self) -> &TocTracker {
        &self.toc
    }

    pub fn finish(self) -> Vec<HeadingCandidate> {
        self.outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::tokenizer::UnicodeTokenizer;
    use crate::heading::toc::TocState;
    use crate::model::{Span, SpanFlags};

    fn line(text: &str, page: u32, size: f32, bold: bool) -> Line {
        let flags = if bold { SpanFlags::BOLD } else { SpanFlags::empty() };
        Line {
            text: text.to_string(),
            page,
            y: 0.0,
            x0: 72.0,
            spans: vec![Span::new(text, "Helvetica", size).with_flags(flags)],
        }
    }

    fn feed(builder: &mut OutlineBuilder, l: Line) -> Option<HeadingLevel> {
        builder.process_line(&l, 612.0, &UnicodeTokenizer).unwrap()
    }

    #[test]
    fn test_first_heading_forced_h1() {
        let mut builder = OutlineBuilder::new();
        assert_eq!(feed(&mut builder, line("Background", 2, 14.0, false)), Some(HeadingLevel::H1));
        assert_eq!(feed(&mut builder, line("Details", 2, 14.0, false)), Some(HeadingLevel::H2));
        assert_eq!(builder.outline().len(), 2);
    }

    #[test]
    fn test_toc_suppresses_five_entries() {
        let mut builder = OutlineBuilder::new();
        feed(&mut builder, line("Preface", 2, 20.0, true));
        feed(&mut builder, line("Table of Contents", 2, 16.0, true));
        assert!(builder.toc().is_active(2));

        for text in ["1. Overview", "2. Scope", "3. Terms", "4. Design", "5. Testing"] {
            assert_eq!(feed(&mut builder, line(text, 2, 11.0, false)), None);
        }
        assert_eq!(
            builder.toc().state(2),
            Some(TocState {
                active: false,
                count: 5
            })
        );

        // The window is closed; the next numbered entry is classified normally
        assert_eq!(
            feed(&mut builder, line("6. Results", 2, 11.0, false)),
            Some(HeadingLevel::H3)
        );
        assert_eq!(builder.finish().len(), 2);
    }

    #[test]
    fn test_long_toc_entry_not_counted() {
        let mut builder = OutlineBuilder::new();
        feed(&mut builder, line("Preface", 2, 20.0, true));
        feed(&mut builder, line("Table of Contents", 2, 16.0, true));

        let long = "1. Overview of the regional programme and its funding arrangements in detail";
        assert_eq!(feed(&mut builder, line(long, 2, 11.0, false)), None);
        assert_eq!(
            builder.toc().state(2),
            Some(TocState {
                active: true,
                count: 0
            })
        );
    }

    #[test]
    fn test_h1_ends_toc_window() {
        let mut builder = OutlineBuilder::new();
        feed(&mut builder, line("Table of Contents", 3, 16.0, true));
        feed(&mut builder, line("1. Overview", 3, 11.0, false));
        assert_eq!(
            feed(&mut builder, line("Introduction", 3, 20.0, true)),
            Some(HeadingLevel::H1)
        );
        assert!(!builder.toc().is_active(3));
        assert_eq!(builder.toc().state(3).map(|s| s.count), Some(1));

        assert_eq!(
            feed(&mut builder, line("2. Scope", 3, 11.0, false)),
            Some(HeadingLevel::H3)
        );
    }

    #[test]
    fn test_toc_is_page_scoped() {
        let mut builder = OutlineBuilder::new();
        feed(&mut builder, line("Table of Contents", 2, 16.0, true));
        assert_eq!(
            feed(&mut builder, line("1. Overview", 3, 11.0, false)),
            Some(HeadingLevel::H1)
        );
        assert!(builder.toc().is_active(2));
    }
}
