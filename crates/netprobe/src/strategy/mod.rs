//! Reachability strategies.
//!
//! A [`Strategy`] is one way of reaching a target. The prober tries its
//! strategies in order until one of them reports [`Metrics`].

pub mod http;
pub mod ping;

use std::time::Duration;

use thiserror::Error;

pub use http::HttpStrategy;
pub use ping::PingStrategy;

use crate::measurement::{Method, Metrics};
use crate::target::Target;

/// Kind of reachability test a strategy performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// ICMP echo via the system ping utility
    Ping,
    /// Single HTTP request to the target's fallback resource
    Http,
}

impl Capability {
    /// Method recorded on measurements produced by this capability
    pub fn method(self) -> Method {
        match self {
            Capability::Ping => Method::Ping,
            Capability::Http => Method::Http,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Ping => write!(f, "ping"),
            Capability::Http => write!(f, "http"),
        }
    }
}

/// Why a strategy could not produce metrics.
///
/// These never leave the prober; they only decide whether the next strategy
/// runs and end up in the logs.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The target lacks what this strategy needs
    #[error("strategy does not apply to this target")]
    NotApplicable,

    /// The probe process could not be started or read
    #[error("failed to run probe: {0}")]
    Spawn(#[from] std::io::Error),

    /// The whole invocation exceeded its budget
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    /// Ping ran but nothing answered
    #[error("no reply to {sent} echo requests")]
    NoReplies { sent: u32 },

    /// Request to the fallback resource failed
    #[error("http request failed: {0}")]
    Http(String),
}

/// One way of testing whether a target is reachable
#[async_trait::async_trait]
pub trait Strategy: Send + Sync {
    /// Capability tag, also decides the recorded method
    fn capability(&self) -> Capability;

    /// Whether this strategy can run against `target` at all
    fn applies_to(&self, target: &Target) -> bool;

    /// Perform the test and return the observed metrics
    async fn attempt(&self, target: &Target, sample_count: u32) -> Result<Metrics, StrategyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_method() {
        assert_eq!(Capability::Ping.method(), Method::Ping);
        assert_eq!(Capability::Http.method(), Method::Http);
        assert_eq!(Capability::Http.to_string(), "http");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StrategyError::NoReplies { sent: 5 }.to_string(),
            "no reply to 5 echo requests"
        );
        assert!(StrategyError::Timeout(Duration::from_secs(60)).to_string().contains("60s"));
    }
}
