//! Measurement model produced by every probe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::quality_score;
use crate::target::Target;

/// Reachability of a target at probe time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Up => write!(f, "UP"),
            Status::Down => write!(f, "DOWN"),
        }
    }
}

/// Strategy that produced a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Ping,
    Http,
    /// No strategy succeeded
    Failed,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Ping => write!(f, "PING"),
            Method::Http => write!(f, "HTTP"),
            Method::Failed => write!(f, "FAILED"),
        }
    }
}

/// Raw path metrics reported by a successful strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Mean round-trip time in milliseconds
    pub avg_latency_ms: f64,
    /// Sample standard deviation of round-trip times in milliseconds
    pub jitter_ms: f64,
    /// Percentage of requests without a reply (0-100)
    pub packet_loss_pct: f64,
}

impl Metrics {
    /// Metrics for a single timed request that succeeded
    pub fn single(latency_ms: f64) -> Self {
        Self { avg_latency_ms: latency_ms, jitter_ms: 0.0, packet_loss_pct: 0.0 }
    }
}

/// Outcome of probing one target.
///
/// Created once per probe and never modified afterwards; the fields are only
/// reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    name: String,
    address: String,
    status: Status,
    avg_latency: f64,
    jitter: f64,
    packet_loss: f64,
    quality_score: f64,
    method: Method,
    timestamp: DateTime<Utc>,
}

impl Measurement {
    /// Build an UP measurement from the metrics of a successful strategy
    pub fn reachable(target: &Target, metrics: Metrics, method: Method) -> Self {
        Self::reachable_at(target, metrics, method, Utc::now())
    }

    /// Same as [`Measurement::reachable`] with an explicit timestamp
    pub fn reachable_at(
        target: &Target,
        metrics: Metrics,
        method: Method,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: target.name().to_string(),
            address: target.address().to_string(),
            status: Status::Up,
            avg_latency: metrics.avg_latency_ms,
            jitter: metrics.jitter_ms,
            packet_loss: metrics.packet_loss_pct,
            quality_score: quality_score(
                metrics.avg_latency_ms,
                metrics.jitter_ms,
                metrics.packet_loss_pct,
            ),
            method,
            timestamp,
        }
    }

    /// Terminal DOWN record used when every strategy failed
    pub fn unreachable(target: &Target) -> Self {
        Self::unreachable_at(target, Utc::now())
    }

    /// Same as [`Measurement::unreachable`] with an explicit timestamp
    pub fn unreachable_at(target: &Target, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: target.name().to_string(),
            address: target.address().to_string(),
            status: Status::Down,
            avg_latency: 0.0,
            jitter: 0.0,
            packet_loss: 100.0,
            quality_score: 0.0,
            method: Method::Failed,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_up(&self) -> bool {
        self.status == Status::Up
    }

    /// Mean round-trip time in milliseconds (0 when DOWN)
    pub fn avg_latency(&self) -> f64 {
        self.avg_latency
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn packet_loss(&self) -> f64 {
        self.packet_loss
    }

    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new("Google", "8.8.8.8")
    }

    #[test]
    fn test_unreachable_shape() {
        let m = Measurement::unreachable(&target());

        assert_eq!(m.status(), Status::Down);
        assert_eq!(m.avg_latency(), 0.0);
        assert_eq!(m.jitter(), 0.0);
        assert_eq!(m.packet_loss(), 100.0);
        assert_eq!(m.quality_score(), 0.0);
        assert_eq!(m.method(), Method::Failed);
        assert_eq!(m.name(), "Google");
        assert_eq!(m.address(), "8.8.8.8");
    }

    #[test]
    fn test_reachable_scores_metrics() {
        let metrics = Metrics { avg_latency_ms: 150.0, jitter_ms: 5.0, packet_loss_pct: 0.0 };
        let m = Measurement::reachable(&target(), metrics, Method::Ping);

        assert!(m.is_up());
        assert_eq!(m.quality_score(), 40.0);
        assert_eq!(m.method(), Method::Ping);
    }

    #[test]
    fn test_serialized_labels() {
        let m = Measurement::reachable(&target(), Metrics::single(20.0), Method::Http);
        let json = serde_json::to_value(&m).unwrap();

        assert_eq!(json["status"], "UP");
        assert_eq!(json["method"], "HTTP");
        assert_eq!(json["packet_loss"], 0.0);
        assert_eq!(Method::Failed.to_string(), "FAILED");
    }
}
