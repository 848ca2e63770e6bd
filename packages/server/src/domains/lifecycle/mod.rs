pub mod coordinator;
pub mod data;

pub use coordinator::{CoordinatorSettings, LifecycleCoordinator};
pub use data::{ChatDetails, CheckInOutcome, OwnedNeed, OwnedOffer};
