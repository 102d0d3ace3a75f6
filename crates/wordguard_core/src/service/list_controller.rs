//! List controller: the single owner of selection, dialog and sync state.
//!
//! # Responsibility
//! - Expose the operations the UI layer calls.
//! - Keep selection state consistent with the live store collection.
//! - Forward lifecycle signals to the reconciliation engine.
//!
//! # Invariants
//! - Every store mutation runs inside the engine's edit window.
//! - A failed store mutation leaves selection and dialog state unchanged.
//! - Words are resolved to their current store instance by text before any
//!   store call, since pulls reassign ids.
//! - After `detach`, no haptic or back-interception calls are made.

use crate::model::word::{find_by_text, Word};
use crate::repo::word_repo::{RepoError, WordFeed, WordRepository, WordSnapshot};
use crate::service::dialog::{AddWordDialog, DraftError};
use crate::service::hooks::{
    BackInterception, HapticFeedback, HapticPulse, NoBackInterception, NoHaptics,
};
use crate::service::matcher::WordMatcher;
use crate::service::selection::{PendingDeleteChange, SelectionSets};
use crate::sync::{LifecycleSignal, ReconcileOutcome, ReconciliationEngine};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Controller error for UI-initiated operations.
#[derive(Debug)]
pub enum ControllerError {
    /// Rejected draft; the dialog stays open for another attempt.
    Validation(DraftError),
    /// Store mutation failed; state is left as it was for a retry.
    Store(RepoError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<DraftError> for ControllerError {
    fn from(value: DraftError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Top-level coordinator used by the presentation layer.
pub struct ListController {
    store: Arc<dyn WordRepository>,
    engine: Arc<ReconciliationEngine>,
    feed: WordFeed,
    words: WordSnapshot,
    selection: SelectionSets,
    dialog: AddWordDialog,
    haptics: Arc<dyn HapticFeedback>,
    haptic_pulse: HapticPulse,
    back: Arc<dyn BackInterception>,
    attached: bool,
}

impl ListController {
    pub fn new(store: Arc<dyn WordRepository>, engine: Arc<ReconciliationEngine>) -> Self {
        let mut feed = store.observe_all();
        let words = feed.borrow_and_update().clone();
        let mut selection = SelectionSets::new();
        selection.sync_with_collection(&words);

        Self {
            store,
            engine,
            feed,
            words,
            selection,
            dialog: AddWordDialog::new(),
            haptics: Arc::new(NoHaptics),
            haptic_pulse: HapticPulse::default(),
            back: Arc::new(NoBackInterception),
            attached: true,
        }
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn HapticFeedback>, pulse: HapticPulse) -> Self {
        self.haptics = haptics;
        self.haptic_pulse = pulse;
        self
    }

    pub fn with_back_interception(mut self, back: Arc<dyn BackInterception>) -> Self {
        self.back = back;
        self
    }

    /// Shared handle for lifecycle sources running elsewhere.
    pub fn engine(&self) -> Arc<ReconciliationEngine> {
        Arc::clone(&self.engine)
    }

    /// Displayed collection, ordered by text.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn matched_words(&self) -> Vec<Word> {
        self.selection.matched().to_vec()
    }

    pub fn pending_delete(&self) -> Vec<Word> {
        self.selection.pending_delete().to_vec()
    }

    pub fn selection(&self) -> &SelectionSets {
        &self.selection
    }

    pub fn in_pending_delete_mode(&self) -> bool {
        self.selection.in_pending_delete_mode()
    }

    pub fn dialog(&self) -> &AddWordDialog {
        &self.dialog
    }

    /// Matcher over the currently matched words.
    pub fn matcher(&self) -> WordMatcher {
        WordMatcher::new(&self.words)
    }

    /// Pulls the latest store snapshot into the controller.
    ///
    /// Returns whether a new snapshot was applied.
    pub fn refresh(&mut self) -> bool {
        if !self.feed.has_changed().unwrap_or(false) {
            return false;
        }
        self.words = self.feed.borrow_and_update().clone();
        let change = self.selection.sync_with_collection(&self.words);
        self.apply_mode_change(change);
        true
    }

    pub fn open_add_dialog(&mut self) {
        self.dialog.open();
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.dialog.set_draft(text);
    }

    pub fn cancel_add_dialog(&mut self) {
        self.dialog.cancel();
    }

    /// Whether the live "word already exists" hint should be shown.
    pub fn shows_duplicate_warning(&self) -> bool {
        self.dialog.shows_duplicate_warning(&self.words)
    }

    /// Validates the draft and inserts it as an unmatched word.
    ///
    /// On success the dialog closes. On validation or store failure it stays
    /// open with the draft intact.
    pub fn submit_add_dialog(&mut self) -> ControllerResult<Word> {
        let engine = Arc::clone(&self.engine);
        let _window = engine.edit_window();
        self.refresh();

        let text = self.dialog.validate(&self.words)?;
        let mut word = Word::new(text);
        word.id = self.store.insert(&word)?;
        self.dialog.close();
        self.refresh();
        info!(
            "event=word_add module=service status=ok word_id={}",
            word.id
        );
        Ok(word)
    }

    /// Opens the dialog if needed, sets the draft and submits it.
    pub fn add_word(&mut self, text: impl Into<String>) -> ControllerResult<Word> {
        if !self.dialog.is_open() {
            self.dialog.open();
        }
        self.dialog.set_draft(text);
        self.submit_add_dialog()
    }

    /// Flips the matched flag of `word` and persists it.
    ///
    /// Returns the new matched state.
    pub fn toggle_match(&mut self, word: &Word) -> ControllerResult<bool> {
        let engine = Arc::clone(&self.engine);
        let _window = engine.edit_window();
        self.refresh();

        let current = find_by_text(&self.words, &word.text)
            .cloned()
            .ok_or(RepoError::NotFound(word.id))?;
        let matched = self.selection.toggle_matched(&current);

        if let Err(err) = self.store.update(&current.clone().with_matched(matched)) {
            self.selection.toggle_matched(&current);
            warn!(
                "event=word_toggle_match module=service status=error word_id={} error={}",
                current.id, err
            );
            return Err(err.into());
        }

        self.refresh();
        Ok(matched)
    }

    /// Adds `word` to pending-delete if the mode is not active yet.
    ///
    /// Returns whether the mode was entered.
    pub fn enter_pending_delete(&mut self, word: &Word) -> bool {
        self.refresh();
        if self.selection.in_pending_delete_mode() {
            return false;
        }
        let Some(current) = find_by_text(&self.words, &word.text).cloned() else {
            return false;
        };

        let change = self.selection.enter_pending_delete(&current);
        self.apply_mode_change(change);
        self.pulse();
        change == PendingDeleteChange::Entered
    }

    /// Flips pending-delete membership while the mode is active.
    pub fn toggle_pending_delete(&mut self, word: &Word) -> PendingDeleteChange {
        self.refresh();
        if !self.selection.in_pending_delete_mode() {
            return PendingDeleteChange::Unchanged;
        }
        let Some(current) = find_by_text(&self.words, &word.text).cloned() else {
            return PendingDeleteChange::Unchanged;
        };

        let change = self.selection.toggle_pending_delete(&current);
        self.apply_mode_change(change);
        self.pulse();
        change
    }

    /// Short tap: toggles pending-delete inside the mode, matched otherwise.
    pub fn tap(&mut self, word: &Word) -> ControllerResult<()> {
        if self.selection.in_pending_delete_mode() {
            self.toggle_pending_delete(word);
            Ok(())
        } else {
            self.toggle_match(word).map(|_| ())
        }
    }

    /// Long press: enters pending-delete mode with `word`.
    pub fn long_press(&mut self, word: &Word) -> bool {
        self.enter_pending_delete(word)
    }

    pub fn select_all_for_delete(&mut self) -> PendingDeleteChange {
        self.refresh();
        let change = self.selection.select_all_pending_delete(&self.words);
        self.apply_mode_change(change);
        change
    }

    pub fn cancel_pending_delete(&mut self) -> PendingDeleteChange {
        let change = self.selection.clear_pending_delete();
        self.apply_mode_change(change);
        change
    }

    /// Answers a back event routed through the installed interception.
    ///
    /// Returns `true` when the event was consumed.
    pub fn handle_back(&mut self) -> bool {
        self.cancel_pending_delete() == PendingDeleteChange::Exited
    }

    /// Deletes every pending-delete word, then leaves the mode.
    ///
    /// The pending set is cleared only after the store delete succeeds; a
    /// successful delete also schedules a mirror wipe for the next push.
    pub fn delete_selected(&mut self) -> ControllerResult<usize> {
        let engine = Arc::clone(&self.engine);
        let _window = engine.edit_window();
        self.refresh();

        let targets = self.selection.pending_delete().to_vec();
        if targets.is_empty() {
            return Ok(0);
        }

        if let Err(err) = self.store.delete(&targets) {
            warn!(
                "event=word_delete module=service status=error count={} error={}",
                targets.len(),
                err
            );
            return Err(err.into());
        }

        engine.mark_bulk_delete();
        let change = self.selection.clear_pending_delete();
        self.apply_mode_change(change);
        self.refresh();
        info!(
            "event=word_delete module=service status=ok count={}",
            targets.len()
        );
        Ok(targets.len())
    }

    /// Runs the reconciliation pass for `signal` and applies its result.
    pub fn on_lifecycle_signal(&mut self, signal: LifecycleSignal) -> ReconcileOutcome {
        let outcome = self.engine.handle_signal(signal);
        self.refresh();
        outcome
    }

    /// Detaches from the host UI. Store work still completes; UI side
    /// effects stop.
    pub fn detach(&mut self) {
        if self.attached && self.selection.in_pending_delete_mode() {
            self.back.uninstall();
        }
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn apply_mode_change(&self, change: PendingDeleteChange) {
        if !self.attached {
            return;
        }
        match change {
            PendingDeleteChange::Entered => self.back.install(),
            PendingDeleteChange::Exited => self.back.uninstall(),
            _ => {}
        }
    }

    fn pulse(&self) {
        if !self.attached {
            return;
        }
        if let Err(err) = self.haptics.pulse(self.haptic_pulse) {
            debug!("event=haptic_pulse module=service status=error error={err}");
        }
    }
}
