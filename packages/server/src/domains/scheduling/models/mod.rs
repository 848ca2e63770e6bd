pub mod coffee_chat;
pub mod proposed_slot;

pub use coffee_chat::{ChatStatus, CoffeeChat};
pub use proposed_slot::{ProposedSlot, SlotStatus};
