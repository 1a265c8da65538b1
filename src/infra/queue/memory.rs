//! In-memory queue store with per-tenant FIFO and a global priority order.

use std::collections::{HashMap, VecDeque};

use crate::core::metrics::QueuedAhead;
use crate::core::request::ScanRequest;
use crate::infra::queue::QueueStore;
use crate::util::ids::{QueueId, TenantId};

/// Entry in the global ordered view. Carries enough of the request to answer
/// position and ETA queries without chasing back into the tenant queues.
#[derive(Debug, Clone)]
struct GlobalEntry {
    priority: u8,
    seq: u64,
    queue_id: QueueId,
    tenant: TenantId,
    tier: crate::core::policy::Tier,
    target_count: usize,
}

/// In-memory [`QueueStore`].
///
/// Per-tenant queues are `VecDeque`s created lazily on first enqueue and
/// dropped once empty. The global view is a `Vec` kept sorted by descending
/// priority with a monotonic sequence number breaking ties, which preserves
/// enqueue order within a priority band even when two requests share a
/// millisecond timestamp.
#[derive(Debug, Default)]
pub struct InMemoryQueueStore {
    tenants: HashMap<TenantId, VecDeque<ScanRequest>>,
    global: Vec<GlobalEntry>,
    next_seq: u64,
}

impl InMemoryQueueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_global(&mut self, queue_id: QueueId) {
        if let Some(idx) = self.global.iter().position(|e| e.queue_id == queue_id) {
            self.global.remove(idx);
        }
    }

    #[cfg(test)]
    fn assert_membership_consistent(&self) {
        let tenant_total: usize = self.tenants.values().map(VecDeque::len).sum();
        assert_eq!(tenant_total, self.global.len());
        for entry in &self.global {
            let queue = self.tenants.get(&entry.tenant).expect("tenant queue exists");
            assert!(queue.iter().any(|r| r.queue_id == entry.queue_id));
        }
    }
}

impl QueueStore for InMemoryQueueStore {
    fn enqueue(&mut self, request: ScanRequest) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = GlobalEntry {
            priority: request.priority,
            seq,
            queue_id: request.queue_id,
            tenant: request.tenant.clone(),
            tier: request.tier,
            target_count: request.target_ids.len(),
        };
        // First index with strictly lower priority; equal priorities stay
        // ahead, giving FIFO within a priority band.
        let idx = self
            .global
            .iter()
            .position(|e| e.priority < entry.priority)
            .unwrap_or(self.global.len());
        self.global.insert(idx, entry);
        debug_assert!(self.global.windows(2).all(|w| {
            w[0].priority > w[1].priority || (w[0].priority == w[1].priority && w[0].seq < w[1].seq)
        }));
        self.tenants
            .entry(request.tenant.clone())
            .or_default()
            .push_back(request);
    }

    fn pop_front(&mut self, tenant: &TenantId) -> Option<ScanRequest> {
        let queue = self.tenants.get_mut(tenant)?;
        let request = queue.pop_front()?;
        if queue.is_empty() {
            self.tenants.remove(tenant);
        }
        self.remove_global(request.queue_id);
        Some(request)
    }

    fn remove(&mut self, tenant: &TenantId, queue_id: QueueId) -> Option<ScanRequest> {
        let queue = self.tenants.get_mut(tenant)?;
        let idx = queue.iter().position(|r| r.queue_id == queue_id)?;
        let request = queue.remove(idx)?;
        if queue.is_empty() {
            self.tenants.remove(tenant);
        }
        self.remove_global(queue_id);
        Some(request)
    }

    fn head(&self, tenant: &TenantId) -> Option<&ScanRequest> {
        self.tenants.get(tenant).and_then(VecDeque::front)
    }

    fn tenants_with_work(&self) -> Vec<TenantId> {
        let mut seen = Vec::new();
        for entry in &self.global {
            if !seen.contains(&entry.tenant) {
                seen.push(entry.tenant.clone());
            }
        }
        seen
    }

    fn queued_count(&self, tenant: &TenantId) -> usize {
        self.tenants.get(tenant).map_or(0, VecDeque::len)
    }

    fn global_position(&self, queue_id: QueueId) -> Option<usize> {
        self.global
            .iter()
            .position(|e| e.queue_id == queue_id)
            .map(|i| i + 1)
    }

    fn requests_ahead(&self, queue_id: QueueId) -> Vec<QueuedAhead> {
        let Some(idx) = self.global.iter().position(|e| e.queue_id == queue_id) else {
            return Vec::new();
        };
        self.global[..idx]
            .iter()
            .map(|e| QueuedAhead {
                tier: e.tier,
                target_count: e.target_count,
            })
            .collect()
    }

    fn first_position(&self, tenant: &TenantId) -> Option<usize> {
        self.global
            .iter()
            .position(|e| &e.tenant == tenant)
            .map(|i| i + 1)
    }

    fn total_len(&self) -> usize {
        self.global.len()
    }
}
