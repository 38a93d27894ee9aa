//! Extraction options and configuration.

/// Options controlling outline extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode for page-level failures
    pub error_mode: ErrorMode,

    /// Apply NFKC normalization to decoded PDF text (ligatures, full-width forms)
    pub normalize_unicode: bool,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Abort a document on its first page failure.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Log and skip failing pages and lines.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable Unicode normalization of decoded text.
    pub fn with_normalize_unicode(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            normalize_unicode: true,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the document on the first page error
    Strict,
    /// Log page and line errors and continue
    #[default]
    Lenient,
}
