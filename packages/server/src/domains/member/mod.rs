pub mod models;

pub use models::member::{Member, NewMember, ProfileUpdate};
