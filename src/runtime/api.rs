//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::policy::Tier;
use crate::core::request::{Admission, ScanSubmission, TenantStatus};
use crate::core::scheduler::{ScanScheduler, Spawn};
use crate::core::{Notifier, ScanExecutor};
use crate::infra::queue::QueueStore;
use crate::util::ids::{QueueId, TenantId};

/// Scan submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Submitting tenant.
    pub tenant_id: String,
    /// Subscription tier claimed for this submission.
    pub tier: Tier,
    /// Identifiers of the targets to scan.
    pub target_ids: Vec<String>,
    /// Opaque metadata passed through to the executor.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Admission outcome reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    /// The job started immediately.
    Dispatched,
    /// The job waits in the queues.
    Queued,
}

/// Response to a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    /// Admission outcome.
    pub status: QueueStatus,
    /// Ticket for cancellation and position lookups.
    pub queue_id: QueueId,
    /// 1-based global queue position, present when queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Estimated start time in milliseconds since epoch, present when queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_start_ms: Option<u128>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Submit a scan through the admission controller.
pub fn submit_scan<Q, X, N, S>(
    scheduler: &ScanScheduler<Q, X, N, S>,
    req: SubmitRequest,
) -> QueueResponse
where
    Q: QueueStore,
    X: ScanExecutor,
    N: Notifier,
    S: Spawn + Send + Sync + 'static,
{
    let admission = scheduler.submit(ScanSubmission {
        tenant: TenantId::from(req.tenant_id),
        tier: req.tier,
        target_ids: req.target_ids,
        metadata: req.metadata,
    });
    match admission {
        Admission::Dispatched { queue_id } => QueueResponse {
            status: QueueStatus::Dispatched,
            queue_id,
            position: None,
            estimated_start_ms: None,
        },
        Admission::Queued {
            queue_id,
            position,
            estimated_start_ms,
        } => QueueResponse {
            status: QueueStatus::Queued,
            queue_id,
            position: Some(position),
            estimated_start_ms: Some(estimated_start_ms),
        },
    }
}

/// Read one tenant's scheduling state.
pub fn tenant_status<Q, X, N, S>(
    scheduler: &ScanScheduler<Q, X, N, S>,
    tenant_id: &str,
) -> TenantStatus
where
    Q: QueueStore,
    X: ScanExecutor,
    N: Notifier,
    S: Spawn + Send + Sync + 'static,
{
    scheduler.status(&TenantId::from(tenant_id))
}

/// Return a health payload.
#[must_use]
pub fn health() -> Health {
    Health { ok: true }
}
