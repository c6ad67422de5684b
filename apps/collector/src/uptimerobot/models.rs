//! Wire types of the UptimeRobot v2 API.
//!
//! Only the fields the sync reads are modelled. Several numeric fields arrive
//! either as JSON numbers or as strings depending on the endpoint.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::ApiError;

/// `{ "stat": "ok" | "fail", "error": {..}, ..body }`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub stat: String,
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.stat == "ok" {
            return Ok(self.body);
        }
        let error = self.error.unwrap_or_default();
        let message = match (error.kind, error.message) {
            (Some(kind), Some(message)) => format!("{kind}: {message}"),
            (None, Some(message)) => message,
            (Some(kind), None) => kind,
            (None, None) => format!("request failed with stat {:?}", self.stat),
        };
        Err(ApiError::Rejected(message))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountBody {
    #[serde(default)]
    pub account: Option<Account>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonitorsBody {
    #[serde(default)]
    pub monitors: Vec<Monitor>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub monitor_limit: Option<u64>,
    /// Check interval in minutes
    #[serde(default, deserialize_with = "lenient_u64")]
    pub monitor_interval: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub up_monitors: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub down_monitors: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub paused_monitors: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Monitor {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub id: Option<u64>,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_i64")]
    pub kind: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub all_time_uptime_ratio: Option<f64>,
    /// One entry per requested window, in request order
    #[serde(default, alias = "custom_uptime_ratio", deserialize_with = "ratio_list")]
    pub custom_uptime_ratios: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_response_time: Option<f64>,
    #[serde(default)]
    pub response_times: Vec<ResponseTime>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub create_datetime: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseTime {
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient_i64")]
    pub datetime: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorStatus {
    Paused,
    NotCheckedYet,
    Up,
    SeemsDown,
    Down,
    Unknown,
}

impl MonitorStatus {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => Self::Paused,
            Some(1) => Self::NotCheckedYet,
            Some(2) => Self::Up,
            Some(8) => Self::SeemsDown,
            Some(9) => Self::Down,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paused => "PAUSED",
            Self::NotCheckedYet => "NOT_CHECKED_YET",
            Self::Up => "UP",
            Self::SeemsDown => "SEEMS_DOWN",
            Self::Down => "DOWN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorType {
    #[serde(rename = "HTTP(s)")]
    Http,
    Keyword,
    Ping,
    Port,
    Heartbeat,
    Unknown,
}

impl MonitorType {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => Self::Http,
            Some(2) => Self::Keyword,
            Some(3) => Self::Ping,
            Some(4) => Self::Port,
            Some(5) => Self::Heartbeat,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP(s)",
            Self::Keyword => "Keyword",
            Self::Ping => "Ping",
            Self::Port => "Port",
            Self::Heartbeat => "Heartbeat",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn value(self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|n| n.is_finite())
    }
}

/// Number or numeric string; anything unparseable becomes `None`
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.and_then(NumberOrText::value))
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(lenient_f64(deserializer)?.filter(|n| n.fract() == 0.0).map(|n| n as i64))
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(lenient_i64(deserializer)?.and_then(|n| u64::try_from(n).ok()))
}

/// `"99.9-100-98.5"` or `["99.9", 100, ...]`
fn ratio_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Option<f64>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ratios {
        Joined(String),
        List(Vec<NumberOrText>),
    }

    Ok(match Option::<Ratios>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Ratios::Joined(joined)) if joined.trim().is_empty() => Vec::new(),
        Some(Ratios::Joined(joined)) => joined
            .split('-')
            .map(|part| part.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
            .collect(),
        Some(Ratios::List(items)) => items.into_iter().map(NumberOrText::value).collect(),
    })
}
