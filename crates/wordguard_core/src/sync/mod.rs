//! Lifecycle-driven reconciliation between the local store and the mirror.
//!
//! # Responsibility
//! - Translate lifecycle signals into push/pull passes.
//! - Serialize passes and exclude concurrent user edits during a pass.
//!
//! # Invariants
//! - Sync failures never destroy local data and never propagate as errors.
//! - Last writer wins; there is no merge.

pub mod engine;
pub mod lifecycle;

pub use engine::{EditWindow, ReconcileOutcome, ReconciliationEngine};
pub use lifecycle::{drive_lifecycle, DriverSummary, LifecycleSignal, SyncAction};
