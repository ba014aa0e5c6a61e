//! Device fingerprinting.
//!
//! A fingerprint identifies a device by the passive signals a client
//! presents on every request. It is a recognition signal, not an
//! authenticator: anyone who can observe the signals can replay them.

use sha2::{Digest, Sha256};

use crate::context::DeviceSignals;

/// Separator between signal fields in the hash input.
///
/// Fields are not escaped, so a separator inside a signal shifts the
/// field boundaries and two different signal sets can collide.
const FIELD_SEPARATOR: &str = "|";

/// Computes the fingerprint for a set of device signals.
///
/// The fingerprint is the lowercase hex SHA-256 digest of the signals
/// joined in canonical order: user agent, accept language, platform,
/// timezone. Absent signals participate as empty strings, so every
/// signal set has a fingerprint.
#[must_use]
pub fn fingerprint(device: &DeviceSignals) -> String {
    let raw = [
        device.user_agent.as_str(),
        device.accept_language.as_str(),
        device.platform.as_str(),
        device.timezone.as_str(),
    ]
    .join(FIELD_SEPARATOR);

    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
