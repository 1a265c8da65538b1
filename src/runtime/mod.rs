//! Runtime adapters and API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{health, submit_scan, tenant_status, Health, QueueResponse, QueueStatus, SubmitRequest};
pub use tokio_spawner::TokioSpawner;
