//! Configuration types for the TrustGate gateway.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the gateway facade.
///
/// Every field has a default, so a partial configuration document
/// fills in the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Behavior store configuration.
    pub store: StoreConfig,

    /// Trust scoring configuration.
    pub scoring: ScoringConfig,
}

impl GateConfig {
    /// The scoring section translated into calculator terms.
    pub(crate) fn calculator_config(&self) -> trustgate_scoring::ScoringConfig {
        trustgate_scoring::ScoringConfig::new()
            .with_window(Duration::from_secs(self.scoring.window_secs))
            .with_op_timeout(Duration::from_millis(self.scoring.op_timeout_ms))
    }
}

/// Behavior store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the embedded behavior database.
    pub db_path: PathBuf,

    /// Maximum number of decision events retained in the capped log.
    pub log_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./trustgate.db"),
            log_capacity: 1_000,
        }
    }
}

/// Trust scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Length of the access-frequency window, in seconds.
    pub window_secs: u64,

    /// Per-operation store deadline, in milliseconds. Store calls
    /// slower than this are treated as outages and the evaluation
    /// proceeds on fallback values.
    pub op_timeout_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            op_timeout_ms: 500,
        }
    }
}
