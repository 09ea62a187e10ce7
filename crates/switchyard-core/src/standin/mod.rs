//! Offline backend stand-ins
//!
//! Deterministic implementations of backend ports that need no network.
//! They are never registered implicitly; wire them in explicitly where a
//! real vendor client is unavailable.

mod moderation;
mod rerank;

pub use moderation::RuleModeration;
pub use rerank::SyntheticRerank;
