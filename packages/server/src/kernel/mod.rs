//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod memory_store;
pub mod notifier;
pub mod postgres_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use memory_store::InMemoryStore;
pub use notifier::LoggingNotifier;
pub use postgres_store::PostgresStore;
pub use test_dependencies::{FaultyStore, RecordingNotifier, SlowEmbedder, TestDependencies};
pub use traits::*;
