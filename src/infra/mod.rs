//! Infrastructure adapters for queue storage and metrics history.

pub mod history;
pub mod queue;

pub use history::{InMemoryHistory, MetricsHistory, PostgresHistory};
pub use queue::{InMemoryQueueStore, QueueStore};
