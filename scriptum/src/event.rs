//! Progress notifications emitted during a migration run.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Lifecycle events of one `migrate` call.
///
/// Events are delivered synchronously, on the calling thread, in the order
/// they happen:
///
/// - **Started**: the ledger is ready and the scan is about to begin
/// - **Verified**: an already applied script still matches its fingerprint
/// - **Pending**: a script has no ledger record and will be applied
/// - **Applied**: a pending script ran and its record was written
/// - **Completed**: every pending script was applied
///
/// A failed run stops emitting at the failure; `Completed` is only sent on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    Started { ledger: String, data_dir: PathBuf },
    Verified { script_id: String },
    Pending { script_id: String },
    Applied { script_id: String },
    Completed { applied: usize },
}

/// Context delivered to a listener with each event.
#[derive(Debug, Clone)]
pub struct MigrationEventInfo {
    event: MigrationEvent,
    ledger: String,
}

impl MigrationEventInfo {
    pub fn new(event: MigrationEvent, ledger: &str) -> Self {
        MigrationEventInfo {
            event,
            ledger: ledger.to_string(),
        }
    }

    pub fn event(&self) -> &MigrationEvent {
        &self.event
    }

    /// Name of the ledger the run is tracking.
    pub fn ledger(&self) -> &str {
        &self.ledger
    }
}

/// A callback that handles migration events.
pub trait MigrationEventCallback: Send + Sync + Fn(MigrationEventInfo) {}

impl<F> MigrationEventCallback for F where F: Send + Sync + Fn(MigrationEventInfo) {}

/// A listener for migration progress.
///
/// Listeners observe; they cannot veto or abort a run.
///
/// ```rust
/// use scriptum::event::{MigrationEvent, MigrationEventListener};
///
/// let listener = MigrationEventListener::new(|info| {
///     if let MigrationEvent::Applied { script_id } = info.event() {
///         println!("applied {}", script_id);
///     }
/// });
/// ```
#[derive(Clone)]
pub struct MigrationEventListener {
    on_event: Arc<dyn MigrationEventCallback>,
}

impl MigrationEventListener {
    pub fn new(on_event: impl MigrationEventCallback + 'static) -> Self {
        MigrationEventListener {
            on_event: Arc::new(on_event),
        }
    }

    pub(crate) fn notify(&self, info: MigrationEventInfo) {
        (self.on_event)(info)
    }
}

impl Debug for MigrationEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEventListener").finish_non_exhaustive()
    }
}

/// Fans an event out to every registered listener.
pub(crate) fn publish(listeners: &[MigrationEventListener], ledger: &str, event: MigrationEvent) {
    if listeners.is_empty() {
        return;
    }
    let info = MigrationEventInfo::new(event, ledger);
    for listener in listeners {
        listener.notify(info.clone());
    }
}
