// ABOUTME: Allow-list policy for restricted smart-contract code.
// ABOUTME: Usage types, allow-list stores, an optional read cache, and the policy matcher.

pub mod cached;
pub mod matcher;
pub mod store;
pub mod types;

pub use cached::*;
pub use matcher::*;
pub use store::*;
pub use types::*;
