//! # Scan Admission
//!
//! A fair admission-control and scheduling engine for long-running scan jobs
//! submitted by tenants of a multi-tier subscription service.
//!
//! Each tenant belongs to a subscription tier that caps how many scan jobs
//! may run concurrently on their behalf. The engine accepts jobs immediately
//! when capacity allows, queues them fairly when it does not, and guarantees
//! that no tenant is starved indefinitely regardless of how aggressively
//! higher-tier tenants submit work.
//!
//! ## Core Problem Solved
//!
//! Multi-tenant scan workloads mix tenants with very different entitlements:
//!
//! - **Per-tenant caps**: a FREE tenant must never occupy more than its share
//! - **Global capacity**: total in-flight scans are bounded process-wide
//! - **Anti-starvation**: priority orders the queue, but round-robin across
//!   tenants guarantees every queued tenant a promotion opportunity per tick
//! - **Useful ETAs**: per-tier duration averages turn a queue position into
//!   an estimated start time
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scan_admission::builders::build_scheduler;
//! use scan_admission::config::SchedulerConfig;
//! use scan_admission::core::{NoopNotifier, ScanSubmission, Tier};
//! use scan_admission::runtime::TokioSpawner;
//!
//! let scheduler = build_scheduler(
//!     &SchedulerConfig::default(),
//!     my_executor, // implements ScanExecutor
//!     NoopNotifier,
//!     None,
//!     TokioSpawner::current(),
//! )?;
//!
//! let admission = scheduler.submit(ScanSubmission {
//!     tenant: "tenant-1".into(),
//!     tier: Tier::Premium,
//!     target_ids: vec!["site-a".into()],
//!     metadata: serde_json::Value::Null,
//! });
//! ```
//!
//! The scheduler never learns how a scan executes. The [`core::ScanExecutor`]
//! collaborator performs the work out-of-band; capacity release and duration
//! recording hang off the resolution of its future, for success and failure
//! alike.
//!
//! For complete examples, see `tests/admission_test.rs` and
//! `tests/fairness_test.rs`.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and capacity accounting.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct scheduler instances from configuration.
pub mod builders;
/// Infrastructure adapters for queue storage and metrics history.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
