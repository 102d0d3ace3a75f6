//! Core logic for the WordGuard word list.
//! This crate owns the word list invariants, the selection state machine and
//! lifecycle-driven reconciliation with the external mirror.

pub mod config;
pub mod db;
pub mod logging;
pub mod mirror;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{ConfigError, WordGuardConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use mirror::{
    MirrorAddress, MirrorError, MirrorRecord, MirrorRegistry, MirrorStore, SqliteMirrorStore,
};
pub use model::word::{Word, WordId, WordValidationError};
pub use repo::word_repo::{
    RepoError, RepoResult, SqliteWordRepository, WordFeed, WordRepository, WordSnapshot,
};
pub use service::dialog::{AddWordDialog, DraftError};
pub use service::hooks::{BackInterception, HapticFeedback, HapticPulse};
pub use service::list_controller::{ControllerError, ControllerResult, ListController};
pub use service::matcher::{find_matches, WordMatcher};
pub use service::selection::{PendingDeleteChange, SelectionSets, WordSet};
pub use sync::{drive_lifecycle, LifecycleSignal, ReconcileOutcome, ReconciliationEngine};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
