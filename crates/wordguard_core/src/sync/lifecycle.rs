//! Lifecycle signal vocabulary and the async signal driver.

use super::engine::{ReconcileOutcome, ReconciliationEngine};
use log::{debug, error, info};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Application state transitions emitted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleSignal {
    Created,
    /// Entering foreground, not yet interactive.
    PreForeground,
    /// Fully interactive foreground.
    ForegroundActive,
    Paused,
    /// Left the foreground.
    Background,
    Destroyed,
}

impl LifecycleSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::PreForeground => "PRE_FOREGROUND",
            Self::ForegroundActive => "FOREGROUND_ACTIVE",
            Self::Paused => "PAUSED",
            Self::Background => "BACKGROUND",
            Self::Destroyed => "DESTROYED",
        }
    }

    /// Parses a host state name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Some(Self::Created),
            "PRE_FOREGROUND" => Some(Self::PreForeground),
            "FOREGROUND_ACTIVE" => Some(Self::ForegroundActive),
            "PAUSED" => Some(Self::Paused),
            "BACKGROUND" => Some(Self::Background),
            "DESTROYED" => Some(Self::Destroyed),
            _ => None,
        }
    }
}

impl Display for LifecycleSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncAction {
    /// Local store to mirror.
    Push,
    /// Mirror to local store.
    Pull,
}

impl SyncAction {
    /// Maps a signal to the pass it triggers, if any.
    pub fn for_signal(signal: LifecycleSignal) -> Option<Self> {
        match signal {
            LifecycleSignal::PreForeground => Some(Self::Push),
            LifecycleSignal::ForegroundActive => Some(Self::Pull),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pull => "pull",
        }
    }
}

/// Counters returned when the signal stream closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverSummary {
    pub signals_received: usize,
    pub duplicates_dropped: usize,
    pub passes_run: usize,
}

/// Consumes lifecycle signals until every sender is dropped.
///
/// Signals are handled strictly in arrival order, one pass at a time, on the
/// blocking pool. Consecutive duplicates already queued behind each other are
/// collapsed into one.
pub async fn drive_lifecycle(
    engine: Arc<ReconciliationEngine>,
    mut signals: mpsc::Receiver<LifecycleSignal>,
) -> DriverSummary {
    let mut summary = DriverSummary::default();
    info!("event=lifecycle_driver module=sync status=start");

    while let Some(first) = signals.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = signals.try_recv() {
            batch.push(next);
        }
        summary.signals_received += batch.len();
        let received = batch.len();
        batch.dedup();
        summary.duplicates_dropped += received - batch.len();

        for signal in batch {
            let engine = Arc::clone(&engine);
            match tokio::task::spawn_blocking(move || engine.handle_signal(signal)).await {
                Ok(ReconcileOutcome::Ignored) => {}
                Ok(outcome) => {
                    summary.passes_run += 1;
                    debug!(
                        "event=lifecycle_signal module=sync status=ok signal={signal} outcome={outcome:?}"
                    );
                }
                Err(err) => {
                    error!(
                        "event=lifecycle_signal module=sync status=error signal={signal} error_code=pass_join_failed error={err}"
                    );
                }
            }
        }
    }

    info!(
        "event=lifecycle_driver module=sync status=ok signals={} passes={}",
        summary.signals_received, summary.passes_run
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::{LifecycleSignal, SyncAction};

    #[test]
    fn only_foreground_transitions_trigger_passes() {
        assert_eq!(
            SyncAction::for_signal(LifecycleSignal::PreForeground),
            Some(SyncAction::Push)
        );
        assert_eq!(
            SyncAction::for_signal(LifecycleSignal::ForegroundActive),
            Some(SyncAction::Pull)
        );
        for signal in [
            LifecycleSignal::Created,
            LifecycleSignal::Paused,
            LifecycleSignal::Background,
            LifecycleSignal::Destroyed,
        ] {
            assert_eq!(SyncAction::for_signal(signal), None);
        }
    }

    #[test]
    fn from_name_accepts_host_spelling() {
        assert_eq!(
            LifecycleSignal::from_name(" pre_foreground "),
            Some(LifecycleSignal::PreForeground)
        );
        assert_eq!(
            LifecycleSignal::from_name("FOREGROUND_ACTIVE"),
            Some(LifecycleSignal::ForegroundActive)
        );
        assert_eq!(LifecycleSignal::from_name("ON_ANY"), None);
    }
}
