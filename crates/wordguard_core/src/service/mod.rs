//! Word list use-case services.
//!
//! # Responsibility
//! - Selection and pending-delete state machine.
//! - Add-word dialog workflow.
//! - Coordination of UI operations, store writes and lifecycle signals.

pub mod dialog;
pub mod hooks;
pub mod list_controller;
pub mod matcher;
pub mod selection;
