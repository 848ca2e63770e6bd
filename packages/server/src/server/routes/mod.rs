// HTTP routes
pub mod admin;
pub mod chats;
pub mod check_ins;
pub mod health;
pub mod matches;
pub mod members;
pub mod stats;

pub use admin::*;
pub use chats::*;
pub use check_ins::*;
pub use health::*;
pub use matches::*;
pub use members::*;
pub use stats::*;
