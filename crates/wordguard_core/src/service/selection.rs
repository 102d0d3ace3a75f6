//! Matched and pending-delete selection sets.
//!
//! # Invariants
//! - Membership is decided by word text, never by id.
//! - After `sync_with_collection`, pending-delete is a subset of the
//!   displayed collection and holds its current instances.
//! - The two sets are independent.

use crate::model::word::Word;
use std::collections::BTreeMap;

/// Ordered set of words keyed by text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    entries: BTreeMap<String, Word>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &Word) -> bool {
        self.entries.contains_key(word.text.as_str())
    }

    /// Returns `true` when the word was not present before.
    pub fn insert(&mut self, word: Word) -> bool {
        self.entries.insert(word.text.clone(), word).is_none()
    }

    /// Returns `true` when the word was present.
    pub fn remove(&mut self, word: &Word) -> bool {
        self.entries.remove(word.text.as_str()).is_some()
    }

    /// Flips membership and returns whether the word is now present.
    pub fn toggle(&mut self, word: &Word) -> bool {
        if self.remove(word) {
            false
        } else {
            self.insert(word.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.entries.values()
    }

    pub fn to_vec(&self) -> Vec<Word> {
        self.entries.values().cloned().collect()
    }

    /// Drops entries whose text is not in `words` and swaps the rest for the
    /// instances in `words`. Returns how many entries were dropped.
    fn retain_present(&mut self, words: &[Word]) -> usize {
        let before = self.entries.len();
        let mut current = BTreeMap::new();
        for word in words {
            if self.entries.contains_key(word.text.as_str()) {
                current.insert(word.text.clone(), word.clone());
            }
        }
        self.entries = current;
        before - self.entries.len()
    }
}

impl FromIterator<Word> for WordSet {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        let mut set = Self::new();
        for word in iter {
            set.insert(word);
        }
        set
    }
}

/// Effect of an operation on pending-delete mode.
///
/// `Entered` and `Exited` are the transitions the caller must answer by
/// installing or removing the back interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingDeleteChange {
    Entered,
    Added,
    Removed,
    Exited,
    Unchanged,
}

impl PendingDeleteChange {
    fn between(was_empty: bool, is_empty: bool, grew: bool) -> Self {
        match (was_empty, is_empty) {
            (true, false) => Self::Entered,
            (false, true) => Self::Exited,
            (true, true) => Self::Unchanged,
            (false, false) if grew => Self::Added,
            (false, false) => Self::Removed,
        }
    }
}

/// The two selection sets over the displayed collection.
#[derive(Debug, Clone, Default)]
pub struct SelectionSets {
    matched: WordSet,
    pending_delete: WordSet,
}

impl SelectionSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matched(&self) -> &WordSet {
        &self.matched
    }

    pub fn pending_delete(&self) -> &WordSet {
        &self.pending_delete
    }

    pub fn is_matched(&self, word: &Word) -> bool {
        self.matched.contains(word)
    }

    pub fn is_pending_delete(&self, word: &Word) -> bool {
        self.pending_delete.contains(word)
    }

    pub fn in_pending_delete_mode(&self) -> bool {
        !self.pending_delete.is_empty()
    }

    /// Flips matched membership. Returns the new matched state.
    pub fn toggle_matched(&mut self, word: &Word) -> bool {
        self.matched.toggle(word)
    }

    /// Adds `word` to pending-delete, entering the mode when it was empty.
    pub fn enter_pending_delete(&mut self, word: &Word) -> PendingDeleteChange {
        let was_empty = self.pending_delete.is_empty();
        if !self.pending_delete.insert(word.clone()) {
            return PendingDeleteChange::Unchanged;
        }
        PendingDeleteChange::between(was_empty, false, true)
    }

    /// Flips pending-delete membership. Only valid inside the mode; outside
    /// it this is a no-op returning `Unchanged`.
    pub fn toggle_pending_delete(&mut self, word: &Word) -> PendingDeleteChange {
        if self.pending_delete.is_empty() {
            return PendingDeleteChange::Unchanged;
        }
        let added = self.pending_delete.toggle(word);
        PendingDeleteChange::between(false, self.pending_delete.is_empty(), added)
    }

    pub fn clear_pending_delete(&mut self) -> PendingDeleteChange {
        let was_empty = self.pending_delete.is_empty();
        self.pending_delete.clear();
        PendingDeleteChange::between(was_empty, true, false)
    }

    /// Replaces pending-delete with the whole displayed collection.
    pub fn select_all_pending_delete(&mut self, all_words: &[Word]) -> PendingDeleteChange {
        let before = self.pending_delete.len();
        self.pending_delete = all_words.iter().cloned().collect();
        let after = self.pending_delete.len();
        if before == after && after > 0 {
            return PendingDeleteChange::Unchanged;
        }
        PendingDeleteChange::between(before == 0, after == 0, after > before)
    }

    /// Rebuilds the matched set from store flags and prunes pending-delete to
    /// the words still displayed.
    pub fn sync_with_collection(&mut self, words: &[Word]) -> PendingDeleteChange {
        self.matched = words.iter().filter(|word| word.matched).cloned().collect();

        let was_empty = self.pending_delete.is_empty();
        let dropped = self.pending_delete.retain_present(words);
        if dropped == 0 {
            return PendingDeleteChange::Unchanged;
        }
        PendingDeleteChange::between(was_empty, self.pending_delete.is_empty(), false)
    }
}
