//! Queue store backends.

pub mod memory;

pub use memory::InMemoryQueueStore;

use crate::core::metrics::QueuedAhead;
use crate::core::request::ScanRequest;
use crate::util::ids::{QueueId, TenantId};

/// Storage of pending requests: per-tenant FIFO queues plus one global
/// ordered view used for priority arbitration and position reporting.
///
/// The per-tenant queues are the authoritative membership; implementations
/// must keep the global view's membership exactly equal to the union of all
/// non-empty per-tenant queues. The trait is the seam for swapping the
/// in-memory store for an external priority-queue-backed one without
/// touching the scheduling algorithm.
pub trait QueueStore: Send + 'static {
    /// Append a request to its tenant's queue and insert it into the global
    /// view at the position determined by priority, then enqueue order.
    fn enqueue(&mut self, request: ScanRequest);

    /// Pop the head of one tenant's queue, removing it from the global view.
    fn pop_front(&mut self, tenant: &TenantId) -> Option<ScanRequest>;

    /// Remove a specific queued request from both structures.
    ///
    /// Returns the request if it was still queued; `None` if unknown or
    /// already dispatched, which makes cancellation idempotent.
    fn remove(&mut self, tenant: &TenantId, queue_id: QueueId) -> Option<ScanRequest>;

    /// Head of one tenant's queue, if any.
    fn head(&self, tenant: &TenantId) -> Option<&ScanRequest>;

    /// Tenants with a non-empty queue, ordered by their head request's
    /// global-queue position.
    fn tenants_with_work(&self) -> Vec<TenantId>;

    /// Number of requests queued for one tenant.
    fn queued_count(&self, tenant: &TenantId) -> usize;

    /// 1-based position of a request in the global ordered view.
    fn global_position(&self, queue_id: QueueId) -> Option<usize>;

    /// Summaries of every request ordered ahead of the given one, used for
    /// ETA estimation.
    fn requests_ahead(&self, queue_id: QueueId) -> Vec<QueuedAhead>;

    /// Global position of a tenant's first queued request.
    fn first_position(&self, tenant: &TenantId) -> Option<usize>;

    /// Total queued requests across all tenants.
    fn total_len(&self) -> usize;

    /// Whether no request is queued anywhere.
    fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}
