//! Fire-and-forget state-transition event emission.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::ids::{QueueId, TenantId};

/// Lifecycle states a request moves through.
///
/// `Queued -> Processing -> {Completed | Failed}`, with `Cancelled` reachable
/// only from `Queued`. No transition leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanState {
    /// Waiting in the queues for capacity.
    Queued,
    /// Handed to the executor.
    Processing,
    /// Executor reported success.
    Completed,
    /// Executor reported failure.
    Failed,
    /// Removed from the queues before dispatch.
    Cancelled,
}

/// One state-transition event, tagged with tenant and queue id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Ticket of the request that transitioned.
    pub queue_id: QueueId,
    /// Owning tenant.
    pub tenant: TenantId,
    /// New state.
    pub state: ScanState,
    /// Event timestamp, milliseconds since epoch.
    pub at_ms: u128,
}

/// Outbound event sink, best-effort by construction.
///
/// The signature is infallible so that a slow or unreachable transport can
/// never fail or delay an admission decision; implementations that talk to a
/// broker should buffer or drop internally.
pub trait Notifier: Send + Sync + 'static {
    /// Emit one state-transition event.
    fn notify(&self, event: ScanEvent);
}

impl<N: Notifier> Notifier for std::sync::Arc<N> {
    fn notify(&self, event: ScanEvent) {
        (**self).notify(event);
    }
}

/// Notifier that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: ScanEvent) {}
}

/// Notifier that records events in memory, for tests and dev.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    events: Mutex<Vec<ScanEvent>>,
}

impl InMemoryNotifier {
    /// Create an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().clone()
    }

    /// Events recorded for one request, in emission order.
    #[must_use]
    pub fn events_for(&self, queue_id: QueueId) -> Vec<ScanState> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.queue_id == queue_id)
            .map(|e| e.state)
            .collect()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, event: ScanEvent) {
        self.events.lock().push(event);
    }
}
