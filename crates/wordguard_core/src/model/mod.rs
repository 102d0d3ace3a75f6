//! Domain model for the curated word list.
//!
//! # Invariants
//! - Two records are the same word iff their `text` values are equal.
//! - Store-assigned ids are not stable across reconciliation pulls.

pub mod word;
