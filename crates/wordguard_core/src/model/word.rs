//! Word domain model.
//!
//! # Responsibility
//! - Define the record shared by the local store, the mirror and selection.
//! - Make word identity (by text, not by id) explicit.
//!
//! # Invariants
//! - `id == UNASSIGNED_WORD_ID` until the record is first persisted.
//! - `text` is never blank for a persisted word.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned integer identity.
pub type WordId = i64;

/// Id carried by a word that has not been persisted yet.
pub const UNASSIGNED_WORD_ID: WordId = 0;

/// Validation errors for persisted word shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordValidationError {
    BlankText,
    NegativeId(WordId),
}

impl Display for WordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankText => write!(f, "word text must not be blank"),
            Self::NegativeId(id) => write!(f, "word id must not be negative, got {id}"),
        }
    }
}

impl Error for WordValidationError {}

/// One entry of the curated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Store-assigned identity, `0` before first persistence.
    #[serde(default)]
    pub id: WordId,
    /// The token itself.
    pub text: String,
    /// Whether the consuming feature counts this word as active.
    #[serde(default)]
    pub matched: bool,
}

impl Word {
    /// Creates an unpersisted, unmatched word.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_WORD_ID,
            text: text.into(),
            matched: false,
        }
    }

    /// Returns a copy with the given store id.
    pub fn with_id(mut self, id: WordId) -> Self {
        self.id = id;
        self
    }

    /// Returns a copy with the given matched flag.
    pub fn with_matched(mut self, matched: bool) -> Self {
        self.matched = matched;
        self
    }

    /// Compares by `text` only (case-sensitive).
    ///
    /// Ids are reassigned on every reconciliation pull, so `id` and `matched`
    /// must not take part in identity.
    pub fn same_word(&self, other: &Word) -> bool {
        self.text == other.text
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNASSIGNED_WORD_ID
    }

    /// Validates shape invariants before persistence.
    pub fn validate(&self) -> Result<(), WordValidationError> {
        if self.text.trim().is_empty() {
            return Err(WordValidationError::BlankText);
        }
        if self.id < 0 {
            return Err(WordValidationError::NegativeId(self.id));
        }
        Ok(())
    }
}

/// Returns the word in `words` whose text equals `text`.
pub fn find_by_text<'a>(words: &'a [Word], text: &str) -> Option<&'a Word> {
    words.iter().find(|word| word.text == text)
}
