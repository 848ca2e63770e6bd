pub mod events;
pub mod machines;
pub mod models;

// Re-export commonly used types
pub use events::SchedulingEvent;
pub use machines::{
    ChatAction, ChatMachine, ChatSnapshot, ChatTransition, SuggestionAction, SuggestionDecision,
    SuggestionMachine,
};
pub use models::{ChatStatus, CoffeeChat, ProposedSlot, SlotStatus};
