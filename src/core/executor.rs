//! Scan execution collaborator contract.

use async_trait::async_trait;

use crate::core::request::ScanRequest;

/// Terminal outcome of one executed scan job.
///
/// The scheduler treats both outcomes identically for capacity release and
/// duration recording; the outcome is only forwarded to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scan ran to completion.
    Success,
    /// The scan failed inside the executor.
    Failure,
}

/// Abstraction over the external component that actually performs a scan.
///
/// The scheduler never learns how a scan executes, only when it finishes.
/// The future returned by [`execute`](Self::execute) must resolve exactly
/// once per dispatched request, even on internal error; the scheduler's
/// capacity release and metrics update hang off that resolution.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use scan_admission::core::{ScanExecutor, ScanOutcome, ScanRequest};
///
/// #[derive(Clone)]
/// struct CrawlerExecutor;
///
/// #[async_trait]
/// impl ScanExecutor for CrawlerExecutor {
///     async fn execute(&self, request: ScanRequest) -> ScanOutcome {
///         match crawl_and_classify(&request.target_ids).await {
///             Ok(()) => ScanOutcome::Success,
///             Err(_) => ScanOutcome::Failure,
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait ScanExecutor: Send + Sync + 'static {
    /// Perform the scan described by `request` and report how it ended.
    async fn execute(&self, request: ScanRequest) -> ScanOutcome;
}

#[async_trait]
impl<X: ScanExecutor> ScanExecutor for std::sync::Arc<X> {
    async fn execute(&self, request: ScanRequest) -> ScanOutcome {
        (**self).execute(request).await
    }
}
