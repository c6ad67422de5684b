//! HTTP fallback for hosts that drop ICMP.

use std::time::{Duration, Instant};

use tracing::debug;

use super::{Capability, Strategy, StrategyError};
use crate::measurement::Metrics;
use crate::stats::round_to;
use crate::target::Target;

/// Default timeout for the fallback request (10 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues one GET to the target's fallback resource and times it.
///
/// Any HTTP response, whatever its status code, proves the host reachable.
#[derive(Debug, Clone)]
pub struct HttpStrategy {
    client: reqwest::Client,
}

impl HttpStrategy {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("netprobe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Strategy for HttpStrategy {
    fn capability(&self) -> Capability {
        Capability::Http
    }

    fn applies_to(&self, target: &Target) -> bool {
        target.fallback_url().is_some()
    }

    async fn attempt(&self, target: &Target, _sample_count: u32) -> Result<Metrics, StrategyError> {
        let url = target.fallback_url().ok_or(StrategyError::NotApplicable)?;

        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                StrategyError::Http("request timed out".to_string())
            } else {
                StrategyError::Http(e.to_string())
            }
        })?;
        let elapsed_ms = round_to(start.elapsed().as_secs_f64() * 1000.0, 2);

        debug!(
            name = target.name(),
            url = %url,
            status = response.status().as_u16(),
            elapsed_ms,
            "Fallback request answered"
        );

        Ok(Metrics::single(elapsed_ms))
    }
}
