//! Trust score computation.
//!
//! [`TrustCalculator`] turns an access attempt into a [`ScoreOutcome`]
//! by checking the attempt against the principal's stored history.
//! Scoring is total: store failures and timeouts never abort an
//! evaluation. When history cannot be read the calculator falls back
//! to conservative defaults (no previous address, a fresh counter, an
//! unrecognized device) and marks the outcome degraded.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use trustgate_policy::TrustScore;
use trustgate_store::BehaviorStore;

use crate::clock::{Clock, SystemClock};
use crate::context::AccessContext;
use crate::deduction::{is_off_hours, Deduction, HIGH_FREQUENCY_THRESHOLD};
use crate::fingerprint::fingerprint;

/// Tuning for the trust calculator.
#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    window: Duration,
    op_timeout: Duration,
}

impl ScoringConfig {
    /// Default sliding window for the frequency counter.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    /// Default per-operation store timeout.
    pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(500);

    #[must_use]
    pub const fn new() -> Self {
        ScoringConfig {
            window: Self::DEFAULT_WINDOW,
            op_timeout: Self::DEFAULT_OP_TIMEOUT,
        }
    }

    /// Sets the sliding window for the frequency counter.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the per-operation store timeout.
    #[must_use]
    pub const fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    #[inline]
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    #[inline]
    #[must_use]
    pub const fn op_timeout(&self) -> Duration {
        self.op_timeout
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of scoring one access attempt.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    /// Final clamped score.
    pub score: TrustScore,
    /// Deductions that fired, in evaluation order.
    pub deductions: Vec<Deduction>,
    /// Fingerprint computed from the attempt's device signals.
    pub fingerprint: String,
    /// True if any store operation failed or timed out and a fallback
    /// value was used in its place.
    pub degraded: bool,
}

impl ScoreOutcome {
    /// Sum of the penalties that fired, before clamping.
    #[must_use]
    pub fn total_penalty(&self) -> u32 {
        self.deductions.iter().map(|d| u32::from(d.penalty())).sum()
    }
}

/// Computes trust scores against a [`BehaviorStore`].
pub struct TrustCalculator {
    store: Arc<dyn BehaviorStore>,
    clock: Arc<dyn Clock>,
    config: ScoringConfig,
}

impl TrustCalculator {
    /// Creates a calculator on the system clock.
    pub fn new(store: Arc<dyn BehaviorStore>, config: ScoringConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    /// Creates a calculator with an explicit time source.
    pub fn with_clock(
        store: Arc<dyn BehaviorStore>,
        clock: Arc<dyn Clock>,
        config: ScoringConfig,
    ) -> Self {
        TrustCalculator {
            store,
            clock,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Scores one access attempt.
    ///
    /// Deductions are checked in a fixed order: address change, off
    /// hours, frequency, sensitivity, device. The order is part of the
    /// event format, not just an implementation detail.
    pub async fn score(&self, principal: &str, context: &AccessContext) -> ScoreOutcome {
        let mut degraded = false;
        let mut deductions = Vec::new();

        let previous_ip = self
            .guarded(
                "last_ip",
                principal,
                None,
                self.store.last_ip(principal),
                &mut degraded,
            )
            .await;
        if previous_ip.is_some_and(|prev| prev != context.source_ip) {
            deductions.push(Deduction::IpChanged);
        }

        if is_off_hours(self.clock.local_hour()) {
            deductions.push(Deduction::OffHours);
        }

        let access_count = self
            .guarded(
                "increment_access_count",
                principal,
                1,
                self.store.increment_access_count(principal, self.config.window),
                &mut degraded,
            )
            .await;
        if access_count > HIGH_FREQUENCY_THRESHOLD {
            deductions.push(Deduction::HighFrequency);
        }

        if context.sensitive {
            deductions.push(Deduction::SensitiveOperation);
        }

        let fingerprint = fingerprint(&context.device);
        let known_device = self
            .guarded(
                "is_known_device",
                principal,
                false,
                self.store.is_known_device(principal, &fingerprint),
                &mut degraded,
            )
            .await;
        if !known_device {
            deductions.push(Deduction::UnknownDevice);
            // Registration follows the check, so a new device is scored
            // as unknown exactly once.
            self.guarded(
                "register_device",
                principal,
                (),
                self.store.register_device(principal, &fingerprint),
                &mut degraded,
            )
            .await;
        }

        self.guarded(
            "set_last_ip",
            principal,
            (),
            self.store.set_last_ip(principal, context.source_ip),
            &mut degraded,
        )
        .await;

        let total: i32 = deductions.iter().map(|d| i32::from(d.penalty())).sum();
        let score = TrustScore::clamped(100 - total);

        self.guarded(
            "set_last_trust_score",
            principal,
            (),
            self.store.set_last_trust_score(principal, score.value()),
            &mut degraded,
        )
        .await;

        debug!(
            principal,
            score = score.value(),
            deductions = deductions.len(),
            degraded,
            "scored access attempt"
        );

        ScoreOutcome {
            score,
            deductions,
            fingerprint,
            degraded,
        }
    }

    /// Runs one store operation under the configured timeout. Failures
    /// and timeouts degrade to the fallback value instead of surfacing.
    async fn guarded<T, F>(
        &self,
        op: &'static str,
        principal: &str,
        fallback: T,
        fut: F,
        degraded: &mut bool,
    ) -> T
    where
        F: Future<Output = trustgate_store::Result<T>>,
    {
        match timeout(self.config.op_timeout, fut).await {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => {
                warn!(principal, op, %error, "store operation failed, continuing degraded");
                *degraded = true;
                fallback
            }
            Err(_) => {
                warn!(
                    principal,
                    op,
                    timeout_ms = self.config.op_timeout.as_millis() as u64,
                    "store operation timed out, continuing degraded"
                );
                *degraded = true;
                fallback
            }
        }
    }
}

impl std::fmt::Debug for TrustCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustCalculator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
