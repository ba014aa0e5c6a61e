//! # Trust Deductions
//!
//! Every access attempt starts from a perfect baseline of 100. Each
//! deduction that fires subtracts a fixed penalty; the clamped sum is
//! the attempt's trust score. Deductions are independent: firing one
//! never suppresses another.
//!
//! ## Penalty Model
//!
//! | Deduction | Penalty | Trigger |
//! |-----------|---------|---------|
//! | Ip Changed | 20 | source address differs from the previous attempt |
//! | Off Hours | 15 | local hour < 6 or > 23 |
//! | High Frequency | 30 | more than 30 attempts in the sliding window |
//! | Sensitive Operation | 10 | operation classified sensitive |
//! | Unknown Device | 25 | device fingerprint not seen before |
//!
//! The penalties sum to exactly 100, so an attempt that trips
//! everything lands on the floor and is denied outright.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counter value above which (strictly) the frequency deduction fires.
pub const HIGH_FREQUENCY_THRESHOLD: u64 = 30;

/// Local hour before which attempts count as off-hours.
pub const OFF_HOURS_MORNING_END: u32 = 6;

/// Local hour after which attempts count as off-hours. Hours run 0-23,
/// so only the morning bound can fire; hour 23 itself is inside hours.
pub const OFF_HOURS_EVENING_START: u32 = 23;

/// Whether a local hour counts as off-hours.
#[inline]
#[must_use]
pub const fn is_off_hours(hour: u32) -> bool {
    hour < OFF_HOURS_MORNING_END || hour > OFF_HOURS_EVENING_START
}

/// A single reason trust was deducted from an access attempt.
///
/// The serialized labels appear in decision events and are consumed by
/// SIEM pipelines; they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deduction {
    /// Source address differs from the previous attempt. Penalty: 20.
    IpChanged,

    /// Attempt arrived in the small hours. Penalty: 15.
    OffHours,

    /// Attempt rate exceeded the window threshold. Penalty: 30.
    HighFrequency,

    /// The operation is classified sensitive. Penalty: 10.
    SensitiveOperation,

    /// Device fingerprint not registered for the principal. Penalty: 25.
    UnknownDevice,
}

impl Deduction {
    /// The penalty this deduction subtracts from the baseline.
    ///
    /// Penalties are fixed at compile time.
    #[inline]
    #[must_use]
    pub const fn penalty(&self) -> u8 {
        match self {
            Self::IpChanged => 20,
            Self::OffHours => 15,
            Self::HighFrequency => 30,
            Self::SensitiveOperation => 10,
            Self::UnknownDevice => 25,
        }
    }
}

impl fmt::Display for Deduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::IpChanged => "ip_changed",
            Self::OffHours => "off_hours",
            Self::HighFrequency => "high_frequency",
            Self::SensitiveOperation => "sensitive_operation",
            Self::UnknownDevice => "unknown_device",
        };
        write!(f, "{label}")
    }
}
