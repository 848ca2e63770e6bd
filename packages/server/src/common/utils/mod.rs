pub mod embeddings;
pub mod text;

pub use embeddings::*;
pub use text::*;
