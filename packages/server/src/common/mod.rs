// Shared ids, errors and value types

pub mod entity_ids;
pub mod error;
pub mod id;
pub mod types;
pub mod utils;

pub use entity_ids::*;
pub use error::{ErrorKind, MatchError, MatchResult};
pub use id::Id;
pub use types::*;
