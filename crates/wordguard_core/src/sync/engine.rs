//! Reconciliation engine.
//!
//! # Responsibility
//! - `PRE_FOREGROUND`: wipe the mirror if a bulk delete is pending, then push
//!   every local word.
//! - `FOREGROUND_ACTIVE`: replace the local store with the mirror snapshot.
//!
//! # Invariants
//! - A failed or unavailable fetch leaves the local store untouched.
//! - A successful fetch replaces local content, even with an empty snapshot.
//! - At most one pass per direction is pending; extra signals are coalesced.
//! - Passes hold the sync window exclusively; controller edits hold it shared.
//! - The bulk-delete flag is cleared once a wipe is issued (or the mirror
//!   platform has no wipe), never on an unreachable mirror.

use super::lifecycle::{LifecycleSignal, SyncAction};
use crate::mirror::{snapshot_to_words, MirrorAddress, MirrorError, MirrorRecord, MirrorRegistry};
use crate::repo::word_repo::WordRepository;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Instant;

/// Shared hold on the sync window; edits made under it never interleave with
/// a reconciliation pass.
pub type EditWindow<'a> = RwLockReadGuard<'a, ()>;

/// Result of handling one lifecycle signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The signal does not trigger a pass.
    Ignored,
    /// A pass in the same direction was already pending.
    Coalesced(SyncAction),
    Pushed {
        wipe_issued: bool,
        pushed: usize,
        failed: usize,
    },
    Pulled {
        replaced: usize,
    },
    /// The mirror could not be resolved for a push; nothing was written.
    PushSkipped(MirrorError),
    /// The mirror was unavailable or returned a bad snapshot.
    PullSkipped(MirrorError),
    /// The local store failed; the pass was abandoned.
    StoreFailed { action: SyncAction, message: String },
}

/// Drives push/pull between the local store and the mirror.
pub struct ReconciliationEngine {
    store: Arc<dyn WordRepository>,
    mirrors: MirrorRegistry,
    address: MirrorAddress,
    bulk_delete_pending: AtomicBool,
    push_in_flight: AtomicBool,
    pull_in_flight: AtomicBool,
    sync_window: RwLock<()>,
}

impl ReconciliationEngine {
    pub fn new(
        store: Arc<dyn WordRepository>,
        mirrors: MirrorRegistry,
        address: MirrorAddress,
    ) -> Self {
        Self {
            store,
            mirrors,
            address,
            bulk_delete_pending: AtomicBool::new(false),
            push_in_flight: AtomicBool::new(false),
            pull_in_flight: AtomicBool::new(false),
            sync_window: RwLock::new(()),
        }
    }

    pub fn address(&self) -> &MirrorAddress {
        &self.address
    }

    /// Records that a multi-delete was committed since the last push.
    ///
    /// A single flag: several deletes before the next push collapse into one
    /// wipe.
    pub fn mark_bulk_delete(&self) {
        self.bulk_delete_pending.store(true, Ordering::Release);
    }

    pub fn bulk_delete_pending(&self) -> bool {
        self.bulk_delete_pending.load(Ordering::Acquire)
    }

    /// Blocks until no pass is running and holds off new passes until dropped.
    pub fn edit_window(&self) -> EditWindow<'_> {
        self.sync_window
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Handles one lifecycle signal to completion.
    ///
    /// Never fails: every error degrades to a skipped pass, reported through
    /// the returned outcome and the log.
    pub fn handle_signal(&self, signal: LifecycleSignal) -> ReconcileOutcome {
        let Some(action) = SyncAction::for_signal(signal) else {
            debug!("event=reconcile module=sync status=skipped signal={signal} reason=ignored_signal");
            return ReconcileOutcome::Ignored;
        };

        let Some(_pending) = InFlight::claim(self.in_flight_flag(action)) else {
            info!(
                "event=reconcile module=sync status=coalesced signal={signal} action={}",
                action.as_str()
            );
            return ReconcileOutcome::Coalesced(action);
        };

        let _window = self
            .sync_window
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match action {
            SyncAction::Push => self.push(),
            SyncAction::Pull => self.pull(),
        }
    }

    fn in_flight_flag(&self, action: SyncAction) -> &AtomicBool {
        match action {
            SyncAction::Push => &self.push_in_flight,
            SyncAction::Pull => &self.pull_in_flight,
        }
    }

    fn push(&self) -> ReconcileOutcome {
        let started_at = Instant::now();
        info!("event=mirror_push module=sync status=start");

        let mirror = match self.mirrors.resolve(&self.address) {
            Ok(mirror) => mirror,
            Err(err) => {
                warn!(
                    "event=mirror_push module=sync status=skipped duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return ReconcileOutcome::PushSkipped(err);
            }
        };

        let words = match self.store.list_all() {
            Ok(words) => words,
            Err(err) => {
                error!(
                    "event=mirror_push module=sync status=error duration_ms={} error_code=store_read_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return ReconcileOutcome::StoreFailed {
                    action: SyncAction::Push,
                    message: err.to_string(),
                };
            }
        };

        let mut wipe_issued = false;
        if self.bulk_delete_pending() {
            if mirror.supports_wipe() {
                if let Err(err) = mirror.wipe() {
                    warn!(
                        "event=mirror_wipe module=sync status=error error_code={} error={}",
                        err.code(),
                        err
                    );
                }
                wipe_issued = true;
            } else {
                debug!("event=mirror_wipe module=sync status=skipped reason=unsupported");
            }
            self.bulk_delete_pending.store(false, Ordering::Release);
        }

        let mut failed = 0;
        for word in &words {
            if let Err(err) = mirror.insert(&MirrorRecord::from(word)) {
                failed += 1;
                warn!(
                    "event=mirror_insert module=sync status=error word_id={} error_code={} error={}",
                    word.id,
                    err.code(),
                    err
                );
            }
        }

        let pushed = words.len() - failed;
        info!(
            "event=mirror_push module=sync status=ok duration_ms={} wipe_issued={} pushed={} failed={}",
            started_at.elapsed().as_millis(),
            wipe_issued,
            pushed,
            failed
        );
        ReconcileOutcome::Pushed {
            wipe_issued,
            pushed,
            failed,
        }
    }

    fn pull(&self) -> ReconcileOutcome {
        let started_at = Instant::now();
        info!("event=mirror_pull module=sync status=start");

        let fetched = self
            .mirrors
            .resolve(&self.address)
            .and_then(|mirror| mirror.fetch_all())
            .and_then(snapshot_to_words);
        let words = match fetched {
            Ok(words) => words,
            Err(err) => {
                warn!(
                    "event=mirror_pull module=sync status=skipped duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return ReconcileOutcome::PullSkipped(err);
            }
        };

        match self.store.replace_all(&words) {
            Ok(replaced) => {
                info!(
                    "event=mirror_pull module=sync status=ok duration_ms={} replaced={}",
                    started_at.elapsed().as_millis(),
                    replaced
                );
                ReconcileOutcome::Pulled { replaced }
            }
            Err(err) => {
                error!(
                    "event=mirror_pull module=sync status=error duration_ms={} error_code=store_replace_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                ReconcileOutcome::StoreFailed {
                    action: SyncAction::Pull,
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Per-direction pending marker, released on drop.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
