//! Authenticated principals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role claim granting access to operator-only surfaces.
pub const ADMIN_ROLE: &str = "admin";

/// An authenticated caller.
///
/// Identity is established upstream; the gateway receives the subject
/// identifier and role set as plain claims and never inspects
/// credentials itself. Two requests with the same `id` share one
/// behavioral history regardless of their role sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable subject identifier.
    pub id: String,

    /// Role claims, carried through to decision events unmodified.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a principal with no role claims.
    pub fn new(id: impl Into<String>) -> Self {
        Principal {
            id: id.into(),
            roles: Vec::new(),
        }
    }

    /// Adds a role claim.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Whether the principal carries the [`ADMIN_ROLE`] claim.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ADMIN_ROLE)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
