//! Behavioral state persistence for the trust gateway.
//!
//! The trust calculator reads and writes per-principal history through
//! the [`BehaviorStore`] trait: last seen source address, a sliding
//! windowed access counter, the set of recognized device fingerprints,
//! and the last computed trust score. Two implementations ship here:
//!
//! | Type | Backing | Use |
//! |------|---------|-----|
//! | [`SledBehaviorStore`] | embedded sled database | production, state survives restarts |
//! | [`MemoryBehaviorStore`] | process memory | tests, ephemeral gateways |
//!
//! The sled store also hosts the capped [`DecisionLog`] audit trail.
//!
//! Store failures never decide access by themselves. Callers are
//! expected to treat errors and timeouts as missing history and fall
//! back to conservative defaults.

pub mod error;
pub mod log;
pub mod memory;
pub mod storage;
pub mod store;

pub use error::{Result, StoreError};
pub use log::DecisionLog;
pub use memory::MemoryBehaviorStore;
pub use storage::SledBehaviorStore;
pub use store::{BehaviorProfile, BehaviorStore};
