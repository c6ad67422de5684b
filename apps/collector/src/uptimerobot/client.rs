use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::ApiError;
use super::models::{Account, AccountBody, Envelope, Monitor, MonitorsBody};

/// Per-endpoint request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub account: Duration,
    pub monitors: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { account: Duration::from_secs(30), monitors: Duration::from_secs(60) }
    }
}

/// Extra data requested with the monitor list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorQuery {
    pub log_limit: u32,
    pub response_times_limit: u32,
    pub custom_uptime_ratios: String,
}

impl Default for MonitorQuery {
    fn default() -> Self {
        Self { log_limit: 10, response_times_limit: 5, custom_uptime_ratios: "1-7-30".into() }
    }
}

/// First ten characters of a key, the only part that is ever logged
pub fn key_prefix(key: &str) -> &str {
    match key.char_indices().nth(10) {
        Some((end, _)) => &key[..end],
        None => key,
    }
}

/// Main API keys start with `ur`/`u`, monitor-specific ones with `m`
pub fn looks_like_api_key(key: &str) -> bool {
    key.starts_with(['u', 'm'])
}

#[derive(Debug, Clone)]
pub struct UptimeRobotClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeouts: Timeouts,
    query: MonitorQuery,
}

impl UptimeRobotClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeouts: Timeouts,
        query: MonitorQuery,
    ) -> Result<Self, ApiError> {
        let api_key = api_key.into();
        if !looks_like_api_key(&api_key) {
            warn!(key = %key_prefix(&api_key), "API key has an unexpected prefix, expected ur, u or m");
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("ispwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url: Url::parse(base_url)?, api_key, timeouts, query })
    }

    pub fn key_prefix(&self) -> &str {
        key_prefix(&self.api_key)
    }

    /// `getAccountDetails`, used to verify the key
    pub async fn account_details(&self) -> Result<Account, ApiError> {
        let body: AccountBody = self.call("getAccountDetails", Vec::new(), self.timeouts.account).await?;
        Ok(body.account.unwrap_or_default())
    }

    /// `getMonitors` with logs, response times and uptime ratios
    pub async fn monitors(&self) -> Result<Vec<Monitor>, ApiError> {
        let params = vec![
            ("logs", "1".to_string()),
            ("log_limit", self.query.log_limit.to_string()),
            ("response_times", "1".to_string()),
            ("response_times_limit", self.query.response_times_limit.to_string()),
            ("all_time_uptime_ratio", "1".to_string()),
            ("custom_uptime_ratios", self.query.custom_uptime_ratios.clone()),
        ];
        let body: MonitorsBody = self.call("getMonitors", params, self.timeouts.monitors).await?;
        Ok(body.monitors)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        mut params: Vec<(&'static str, String)>,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        let url = self.base_url.join(method)?;
        params.insert(0, ("api_key", self.api_key.clone()));
        params.insert(1, ("format", "json".to_string()));

        debug!(%url, "Calling UptimeRobot");
        let response = self
            .client
            .post(url)
            .form(&params)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        envelope.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("ur123456-abcdefghijkl"), "ur123456-a");
        assert_eq!(key_prefix("short"), "short");
        assert_eq!(key_prefix(""), "");
    }

    #[test]
    fn test_key_format() {
        assert!(looks_like_api_key("ur123-abc"));
        assert!(looks_like_api_key("u123-abc"));
        assert!(looks_like_api_key("m777-abc"));
        assert!(!looks_like_api_key("abc"));
    }

    #[test]
    fn test_invalid_base_url() {
        let result =
            UptimeRobotClient::new("not a url", "ur1", Timeouts::default(), MonitorQuery::default());
        assert!(matches!(result, Err(ApiError::Url(_))));
    }
}
