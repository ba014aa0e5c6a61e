//! Access attempt context.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Resources under this prefix are classified sensitive unless the
/// caller overrides the classification.
const SENSITIVE_RESOURCE_PREFIX: &str = "/admin";

/// Whether a resource path falls in the sensitive class by default.
#[must_use]
pub fn is_sensitive_resource(resource: &str) -> bool {
    resource.starts_with(SENSITIVE_RESOURCE_PREFIX)
}

/// Client-observable device characteristics.
///
/// Absent signals participate as empty strings, so a client that sends
/// nothing still produces a stable (if weak) fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSignals {
    pub user_agent: String,
    pub accept_language: String,
    pub platform: String,
    pub timezone: String,
}

/// Everything known about a single access attempt.
#[derive(Debug, Clone)]
pub struct AccessContext {
    /// Source address the attempt arrived from.
    pub source_ip: IpAddr,
    /// Resource being accessed.
    pub resource: String,
    /// Whether the attempted operation is sensitive.
    pub sensitive: bool,
    /// Device characteristics for fingerprinting.
    pub device: DeviceSignals,
}

impl AccessContext {
    /// Builds a context for `resource`, classifying sensitivity with
    /// [`is_sensitive_resource`].
    pub fn new(source_ip: IpAddr, resource: impl Into<String>) -> Self {
        let resource = resource.into();
        let sensitive = is_sensitive_resource(&resource);
        AccessContext {
            source_ip,
            resource,
            sensitive,
            device: DeviceSignals::default(),
        }
    }

    #[must_use]
    pub fn with_device(mut self, device: DeviceSignals) -> Self {
        self.device = device;
        self
    }

    /// Overrides the default sensitivity classification.
    #[must_use]
    pub fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }
}
