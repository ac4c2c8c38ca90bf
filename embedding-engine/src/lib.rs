//! Batch embedding of images against a pool of providers.

pub mod coordinator;
pub mod pool;
pub mod provider;

pub use coordinator::{EmbeddingCoordinator, Progress};
pub use pool::WorkerPool;
pub use provider::{EmbeddingProvider, PrecomputedProvider};
