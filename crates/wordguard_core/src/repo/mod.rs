//! Persistent word store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the store contract consumed by the controller and sync engine.
//! - Isolate SQL details from selection and reconciliation logic.
//!
//! # Invariants
//! - Write paths call `Word::validate()` before SQL mutations.
//! - Observers only ever see committed, whole-collection snapshots.

pub mod word_repo;
