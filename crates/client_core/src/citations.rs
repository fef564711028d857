//! Holds the one citation currently open for inspection.

use shared::domain::Citation;

/// Every way the inspection surface can be closed. They all clear the same
/// slot; the reason only shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    Dismiss,
    Backdrop,
    Navigation,
}

impl ClearReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dismiss => "dismiss",
            Self::Backdrop => "backdrop",
            Self::Navigation => "navigation",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationStore {
    selected: Option<Citation>,
}

impl CitationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any current selection. Returns the citation it displaced.
    pub fn select(&mut self, citation: Citation) -> Option<Citation> {
        self.selected.replace(citation)
    }

    /// Returns whether something was actually open.
    pub fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn selected(&self) -> Option<&Citation> {
        self.selected.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }
}
