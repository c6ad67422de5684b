//! netprobe - host reachability probing for ispwatch
//!
//! This library measures whether a host is reachable and how good the path to
//! it is: round-trip latency, jitter, packet loss and a derived quality score.
//! Probing is a chain of strategies (ICMP ping, then an optional HTTP
//! fallback) that always ends in a [`Measurement`], never in an error.

pub mod measurement;
pub mod ping;
pub mod prober;
pub mod quality;
pub mod stats;
pub mod strategy;
pub mod target;

// Re-export main types
pub use measurement::{Measurement, Method, Metrics, Status};
pub use prober::{ProbeError, ProbeSettings, Prober};
pub use quality::quality_score;
pub use strategy::{Capability, HttpStrategy, PingStrategy, Strategy, StrategyError};
pub use target::{Target, TargetError};

/// Number of echo requests sent per probe unless configured otherwise
pub const DEFAULT_SAMPLE_COUNT: u32 = 5;
