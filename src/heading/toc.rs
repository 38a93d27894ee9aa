//! Per-page table-of-contents suppression state.

use std::collections::BTreeMap;

/// Numbered entries suppressed before the TOC window closes.
pub const TOC_ENTRY_LIMIT: u32 = 5;

/// Suppression state of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TocState {
    pub active: bool,
    /// Suppressed numbered entries since the header was seen
    pub count: u32,
}

/// TOC states keyed by page number.
///
/// Pages without an entry behave as inactive.
#[derive(Debug, Clone, Default)]
pub struct TocTracker {
    pages: BTreeMap<u32, TocState>,
}

impl TocTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A "Table of Contents" header was seen on the page.
    pub fn begin(&mut self, page: u32) {
        log::debug!("page {}: table of contents starts", page);
        self.pages.insert(
            page,
            TocState {
                active: true,
                count: 0,
            },
        );
    }

    pub fn is_active(&self, page: u32) -> bool {
        self.pages.get(&page).is_some_and(|s| s.active)
    }

    /// State of a page, if one was ever created.
    pub fn state(&self, page: u32) -> Option<TocState> {
        self.pages.get(&page).copied()
    }

    /// Count a suppressed numbered entry; closes the window at the limit.
    pub fn record_suppressed(&mut self, page: u32) {
        let state = self.pages.entry(page).or_default();
        state.count += 1;
        if state.count >= TOC_ENTRY_LIMIT {
            state.active = false;
            log::debug!("page {}: table of contents closed after {} entries", page, state.count);
        }
    }

    /// Deactivate a page's state, if present.
    pub fn close(&mut self, page: u32) {
        if let Some(state) = self.pages.get_mut(&page) {
            if state.active {
                log::debug!("page {}: table of contents closed by heading", page);
            }
            state.active = false;
        }
    }
}
