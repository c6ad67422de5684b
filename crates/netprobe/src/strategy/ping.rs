//! ICMP echo through the system ping utility.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{Capability, Strategy, StrategyError};
use crate::measurement::Metrics;
use crate::ping::{PING_PROGRAM, parse_reply_times, parse_transmit_summary, ping_args};
use crate::stats::summarize_replies;
use crate::target::{Target, validate_address};

/// Default wait for each echo reply (10 seconds)
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default budget for the whole ping invocation (60 seconds)
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends echo requests with the system `ping` and reduces the replies.
///
/// The exit code is ignored: replies found in the output decide success, so a
/// run with partial loss still yields metrics.
#[derive(Debug, Clone)]
pub struct PingStrategy {
    program: String,
    reply_timeout: Duration,
    invocation_timeout: Duration,
}

impl Default for PingStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_TIMEOUT, DEFAULT_INVOCATION_TIMEOUT)
    }
}

impl PingStrategy {
    pub fn new(reply_timeout: Duration, invocation_timeout: Duration) -> Self {
        Self { program: PING_PROGRAM.to_string(), reply_timeout, invocation_timeout }
    }

    /// Use a different executable than `ping`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(&self, address: &str, sample_count: u32) -> Result<String, StrategyError> {
        let args = ping_args(address, sample_count, self.reply_timeout);
        debug!(program = %self.program, ?args, "Running ping");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.invocation_timeout, child)
            .await
            .map_err(|_| StrategyError::Timeout(self.invocation_timeout))??;

        if !output.stderr.is_empty() {
            debug!(
                address,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ping wrote to stderr"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl Strategy for PingStrategy {
    fn capability(&self) -> Capability {
        Capability::Ping
    }

    fn applies_to(&self, target: &Target) -> bool {
        validate_address(target.address()).is_ok()
    }

    async fn attempt(&self, target: &Target, sample_count: u32) -> Result<Metrics, StrategyError> {
        if !self.applies_to(target) {
            return Err(StrategyError::NotApplicable);
        }

        let stdout = self.run(target.address(), sample_count).await?;
        let rtts = parse_reply_times(&stdout);

        if let Some((sent, received)) = parse_transmit_summary(&stdout) {
            debug!(
                name = target.name(),
                sent,
                received,
                parsed = rtts.len(),
                "ping statistics"
            );
        }

        summarize_replies(sample_count, &rtts).ok_or(StrategyError::NoReplies { sent: sample_count })
    }
}
