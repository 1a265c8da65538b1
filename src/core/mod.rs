//! Core scheduling abstractions and capacity accounting.

pub mod error;
pub mod executor;
pub mod metrics;
pub mod notifier;
pub mod policy;
pub mod request;
pub mod scheduler;

pub use error::{AppResult, SchedulerError};
pub use executor::{ScanExecutor, ScanOutcome};
pub use metrics::{
    EtaStrategy, MetricsTracker, QueuedAhead, SizeScaledEta, TierMetrics, TierSeed,
    DEFAULT_METRICS_WINDOW,
};
pub use notifier::{InMemoryNotifier, NoopNotifier, Notifier, ScanEvent, ScanState};
pub use policy::{PlanLimit, PlanPolicy, PlanSpec, Tier};
pub use request::{Admission, ScanRequest, ScanSubmission, TenantStatus};
pub use scheduler::{ScanScheduler, SchedulerLimits, Spawn};
