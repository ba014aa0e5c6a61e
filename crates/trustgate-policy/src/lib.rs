//! Tier table mapping trust scores to access decisions.
//!
//! This crate is the pure tail end of the gateway pipeline: given a
//! [`TrustScore`] it produces a [`PolicyDecision`] deterministically,
//! with no I/O and no failure path. Score computation lives upstream;
//! everything here is a total function over `0..=100`.
//!
//! | Module     | Contents                                             |
//! |------------|------------------------------------------------------|
//! | `score`    | [`TrustScore`] (clamped by construction), [`RiskLevel`] |
//! | `decision` | [`PolicyDecision`], tier enums, [`decide`]           |

pub mod decision;
pub mod score;

pub use decision::{
    decide, AccessAction, MonitoringLevel, PolicyDecision, ReasonCode, Restriction,
};
pub use score::{RiskLevel, TrustScore};
