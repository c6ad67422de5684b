//! Client for the UptimeRobot v2 API

mod client;
mod models;

use thiserror::Error;

pub use client::{MonitorQuery, Timeouts, UptimeRobotClient};
pub use models::{Monitor, MonitorStatus, MonitorType, ResponseTime};

/// Every variant aborts the sync run
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),
}
