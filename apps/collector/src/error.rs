use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::uptimerobot::ApiError;

/// Anything that makes a run exit non-zero
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to persist results: {0}")]
    Storage(#[from] StorageError),
    #[error("uptime monitor api error: {0}")]
    Api(#[from] ApiError),
    #[error("probe setup failed: {0}")]
    Probe(#[from] netprobe::ProbeError),
}
