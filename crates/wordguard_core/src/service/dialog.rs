//! Add-word dialog state and draft validation.

use crate::model::word::Word;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Draft rejected by the add-word workflow. The dialog stays open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    Blank,
    /// A word with the same text already exists.
    Duplicate(String),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "word must not be blank"),
            Self::Duplicate(_) => write!(f, "word already exists"),
        }
    }
}

impl Error for DraftError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddWordDialog {
    open: bool,
    draft: String,
}

impl AddWordDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the dialog with an empty draft.
    pub fn open(&mut self) {
        self.open = true;
        self.draft.clear();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Closes without mutating anything.
    pub fn cancel(&mut self) {
        self.open = false;
        self.draft.clear();
    }

    /// Whether the live "word already exists" hint should be shown.
    pub fn shows_duplicate_warning(&self, existing: &[Word]) -> bool {
        let text = self.draft.trim();
        !text.is_empty() && existing.iter().any(|word| word.text == text)
    }

    /// Returns the text to insert, trimmed, or the reason it is rejected.
    pub fn validate(&self, existing: &[Word]) -> Result<String, DraftError> {
        let text = self.draft.trim();
        if text.is_empty() {
            return Err(DraftError::Blank);
        }
        if existing.iter().any(|word| word.text == text) {
            return Err(DraftError::Duplicate(text.to_string()));
        }
        Ok(text.to_string())
    }

    pub(crate) fn close(&mut self) {
        self.cancel();
    }
}
