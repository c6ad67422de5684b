//! Prober - runs the strategy chain against one target at a time.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::DEFAULT_SAMPLE_COUNT;
use crate::measurement::Measurement;
use crate::strategy::http::DEFAULT_HTTP_TIMEOUT;
use crate::strategy::ping::{DEFAULT_INVOCATION_TIMEOUT, DEFAULT_REPLY_TIMEOUT};
use crate::strategy::{HttpStrategy, PingStrategy, Strategy};
use crate::target::Target;

/// Errors that are caller mistakes rather than probe outcomes
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("sample count must be greater than zero")]
    InvalidSampleCount,

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Timing knobs for the standard strategy chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Echo requests per probe
    pub sample_count: u32,
    /// Wait for each echo reply
    pub reply_timeout: Duration,
    /// Budget for one whole ping invocation
    pub invocation_timeout: Duration,
    /// Timeout of the HTTP fallback request
    pub http_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            invocation_timeout: DEFAULT_INVOCATION_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// Ordered chain of strategies.
///
/// The first strategy that returns metrics wins. When every applicable
/// strategy fails the result is the terminal DOWN measurement.
pub struct Prober {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Prober {
    /// Create a prober from an explicit strategy list
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Ping first, then the HTTP fallback
    pub fn standard(settings: &ProbeSettings) -> Result<Self, ProbeError> {
        let ping = PingStrategy::new(settings.reply_timeout, settings.invocation_timeout);
        let http = HttpStrategy::new(settings.http_timeout)?;
        Ok(Self::new(vec![Box::new(ping), Box::new(http)]))
    }

    /// Number of strategies in the chain
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Probe `target` with `sample_count` echo requests.
    ///
    /// Unreachability is data, so the only error is a zero sample count.
    pub async fn probe(&self, target: &Target, sample_count: u32) -> Result<Measurement, ProbeError> {
        if sample_count == 0 {
            return Err(ProbeError::InvalidSampleCount);
        }

        for strategy in &self.strategies {
            let capability = strategy.capability();

            if !strategy.applies_to(target) {
                debug!(name = target.name(), %capability, "Strategy does not apply, skipping");
                continue;
            }

            match strategy.attempt(target, sample_count).await {
                Ok(metrics) => {
                    let measurement = Measurement::reachable(target, metrics, capability.method());
                    info!(
                        name = target.name(),
                        address = target.address(),
                        method = %measurement.method(),
                        latency_ms = measurement.avg_latency(),
                        jitter_ms = measurement.jitter(),
                        loss_pct = measurement.packet_loss(),
                        score = measurement.quality_score(),
                        "Target reachable"
                    );
                    return Ok(measurement);
                }
                Err(e) => {
                    warn!(
                        name = target.name(),
                        address = target.address(),
                        %capability,
                        error = %e,
                        "Strategy failed"
                    );
                }
            }
        }

        warn!(name = target.name(), address = target.address(), "Target unreachable");
        Ok(Measurement::unreachable(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.sample_count, 5);
        assert_eq!(settings.reply_timeout, Duration::from_secs(10));
        assert_eq!(settings.invocation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_standard_chain_order() {
        let prober = Prober::standard(&ProbeSettings::default()).unwrap();
        assert_eq!(prober.len(), 2);
        assert_eq!(prober.strategies[0].capability(), crate::Capability::Ping);
        assert_eq!(prober.strategies[1].capability(), crate::Capability::Http);
    }

    #[tokio::test]
    async fn test_zero_samples_rejected() {
        let prober = Prober::new(Vec::new());
        let target = Target::new("Google", "8.8.8.8");
        assert!(matches!(prober.probe(&target, 0).await, Err(ProbeError::InvalidSampleCount)));
    }

    #[tokio::test]
    async fn test_empty_chain_is_down() {
        let prober = Prober::new(Vec::new());
        let target = Target::new("Google", "8.8.8.8");
        let measurement = prober.probe(&target, 5).await.unwrap();
        assert!(!measurement.is_up());
    }
}
