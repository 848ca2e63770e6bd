// Founder Match - API Core
//
// Matches founders' needs with other founders' offers, then carries an
// accepted match through slot negotiation to a confirmed coffee chat.
//
// Ranking and transition rules are pure domain code (domains/*/actions,
// domains/*/machines); storage, embeddings and notifications sit behind the
// Base* traits in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
