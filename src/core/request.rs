//! Scan request model and admission outcomes.

use serde::{Deserialize, Serialize};

use crate::core::policy::Tier;
use crate::util::ids::{QueueId, TenantId};

/// A unit of queued or executing scan work.
///
/// Created once at submission and read-only thereafter; it leaves the
/// scheduler's structures on dispatch, completion, or cancellation. The tier
/// and the priority derived from it are captured at submission time and never
/// re-read from the plan policy afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Queue ticket identifier, unique per submission.
    pub queue_id: QueueId,
    /// Submitting tenant.
    pub tenant: TenantId,
    /// Subscription tier at submission time.
    pub tier: Tier,
    /// Identifiers of the targets to scan.
    pub target_ids: Vec<String>,
    /// Priority derived from the tier at enqueue time.
    pub priority: u8,
    /// Enqueue timestamp, milliseconds since epoch.
    pub queued_at_ms: u128,
    /// Opaque metadata passed through to the executor.
    pub metadata: serde_json::Value,
}

/// Caller-supplied fields of a submission; the scheduler fills in the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSubmission {
    /// Submitting tenant.
    pub tenant: TenantId,
    /// Subscription tier claimed for this submission.
    pub tier: Tier,
    /// Identifiers of the targets to scan.
    pub target_ids: Vec<String>,
    /// Opaque metadata passed through to the executor.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Outcome of an admission decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// Capacity was available; the job was handed to the executor.
    Dispatched {
        /// Ticket identifying the dispatched job.
        queue_id: QueueId,
    },
    /// Capacity was exhausted; the job waits in the queues.
    Queued {
        /// Ticket for cancellation and position lookups.
        queue_id: QueueId,
        /// 1-based position in the global ordered queue.
        position: usize,
        /// Estimated wall-clock start time, milliseconds since epoch.
        estimated_start_ms: u128,
    },
}

impl Admission {
    /// Queue ticket for either outcome.
    #[must_use]
    pub fn queue_id(&self) -> QueueId {
        match self {
            Self::Dispatched { queue_id } | Self::Queued { queue_id, .. } => *queue_id,
        }
    }

    /// Whether the job started immediately.
    #[must_use]
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }
}

/// Read-only per-tenant view returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantStatus {
    /// Jobs currently executing for the tenant.
    pub active_count: u32,
    /// Jobs waiting in the tenant's queue.
    pub queued_count: usize,
    /// Global position of the tenant's first queued request, if any.
    pub position: Option<usize>,
}
