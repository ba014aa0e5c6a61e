//! Behavioral trust scoring.
//!
//! Scores access attempts against each principal's stored history.
//! Every attempt starts from a baseline of 100; independent deductions
//! subtract fixed penalties and the clamped sum becomes the attempt's
//! [`TrustScore`](trustgate_policy::TrustScore).
//!
//! | Module | Contents |
//! |--------|----------|
//! | `context` | [`AccessContext`], [`DeviceSignals`] |
//! | `fingerprint` | device [`fingerprint`] hashing |
//! | `clock` | [`Clock`] seam, [`SystemClock`], [`FixedClock`] |
//! | `deduction` | [`Deduction`] penalty table |
//! | `calculator` | [`TrustCalculator`], [`ScoreOutcome`], [`ScoringConfig`] |
//!
//! Scoring never fails. If the behavior store is down or slow, the
//! calculator substitutes conservative fallbacks, marks the outcome
//! degraded, and keeps answering.

pub mod calculator;
pub mod clock;
pub mod context;
pub mod deduction;
pub mod fingerprint;

pub use calculator::{ScoreOutcome, ScoringConfig, TrustCalculator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{is_sensitive_resource, AccessContext, DeviceSignals};
pub use deduction::{is_off_hours, Deduction, HIGH_FREQUENCY_THRESHOLD};
pub use fingerprint::fingerprint;
