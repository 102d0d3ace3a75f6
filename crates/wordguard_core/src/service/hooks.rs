//! Host collaborators invoked for UI side effects.
//!
//! Both are fire-and-forget from the controller's point of view: failures are
//! logged and ignored, and implementations must not block.

use serde::{Deserialize, Serialize};

/// One-shot vibration pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticPulse {
    pub duration_ms: u32,
    pub amplitude: u8,
}

impl Default for HapticPulse {
    fn default() -> Self {
        Self {
            duration_ms: 50,
            amplitude: 255,
        }
    }
}

pub trait HapticFeedback: Send + Sync {
    fn pulse(&self, pulse: HapticPulse) -> Result<(), String>;
}

/// Host "back" navigation hook. While installed, a back event must be routed
/// to `ListController::handle_back` instead of default navigation.
pub trait BackInterception: Send + Sync {
    fn install(&self);
    fn uninstall(&self);
}

/// Host without a vibrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn pulse(&self, _pulse: HapticPulse) -> Result<(), String> {
        Ok(())
    }
}

/// Host without back navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackInterception;

impl BackInterception for NoBackInterception {
    fn install(&self) {}

    fn uninstall(&self) {}
}
