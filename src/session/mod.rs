// ABOUTME: Session module — bounded developer-session cache and its persistence.
// ABOUTME: Remembers method and deploy arguments plus recently used contract addresses.

pub mod cache;
pub mod persistence;
pub mod recency;

pub use cache::{
    AddressScope, CacheLimits, DEFAULT_ADDRESS_CAPACITY, DEFAULT_METHOD_ARGS_CAPACITY,
    SessionCache, SessionState, encode_method_key,
};
pub use persistence::workspace_hash;
pub use recency::RecencyList;
