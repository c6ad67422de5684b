//! UptimeRobot sync: fetch monitors, normalize them and write them out.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::storage::{CsvLog, CsvRecord, DailyLog, DataLayout, write_summary};
use crate::uptimerobot::{Monitor, MonitorStatus, MonitorType, UptimeRobotClient};

/// Used when the account does not report its check interval
pub const DEFAULT_MONITOR_INTERVAL: u64 = 5;

/// One monitor as stored by the dashboard files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRecord {
    pub timestamp: DateTime<Utc>,
    pub monitor_id: Option<u64>,
    pub friendly_name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MonitorType,
    pub status: MonitorStatus,
    pub uptime_percentage: f64,
    pub response_time_ms: u64,
    pub create_datetime: Option<i64>,
    /// Account check interval in minutes
    pub monitor_interval: u64,
}

impl MonitorRecord {
    pub fn from_monitor(monitor: &Monitor, monitor_interval: u64, timestamp: DateTime<Utc>) -> Self {
        let status = MonitorStatus::from_code(monitor.status);
        Self {
            timestamp,
            monitor_id: monitor.id,
            friendly_name: monitor.friendly_name.clone(),
            url: monitor.url.clone(),
            kind: MonitorType::from_code(monitor.kind),
            status,
            uptime_percentage: netprobe::stats::round_to(uptime_percentage(monitor, status), 2),
            response_time_ms: response_time_ms(monitor),
            create_datetime: monitor.create_datetime,
            monitor_interval,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == MonitorStatus::Up
    }
}

impl CsvRecord for MonitorRecord {
    const HEADER: &'static [&'static str] = &[
        "timestamp",
        "monitor_id",
        "friendly_name",
        "url",
        "type",
        "status",
        "uptime_percentage",
        "response_time_ms",
        "create_datetime",
        "monitor_interval",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.monitor_id.map(|id| id.to_string()).unwrap_or_default(),
            self.friendly_name.clone(),
            self.url.clone(),
            self.kind.to_string(),
            self.status.to_string(),
            self.uptime_percentage.to_string(),
            self.response_time_ms.to_string(),
            self.create_datetime.map(|t| t.to_string()).unwrap_or_default(),
            self.monitor_interval.to_string(),
        ]
    }
}

/// 1-day custom ratio, then all-time ratio, then the current status
fn uptime_percentage(monitor: &Monitor, status: MonitorStatus) -> f64 {
    monitor
        .custom_uptime_ratios
        .first()
        .copied()
        .flatten()
        .or(monitor.all_time_uptime_ratio)
        .unwrap_or(if status == MonitorStatus::Up { 100.0 } else { 0.0 })
}

/// Newest response-time sample, then the average, then 0
fn response_time_ms(monitor: &Monitor) -> u64 {
    let newest = monitor
        .response_times
        .iter()
        .filter_map(|sample| sample.value.map(|value| (sample.datetime, value)))
        .reduce(|best, next| if next.0 > best.0 { next } else { best })
        .map(|(_, value)| value);

    newest
        .or(monitor.average_response_time)
        .filter(|ms| *ms > 0.0)
        .map(|ms| ms as u64)
        .unwrap_or(0)
}

/// Aggregate document consumed by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub last_updated: DateTime<Utc>,
    pub total_monitors: usize,
    pub monitors_up: usize,
    /// DOWN, SEEMS_DOWN and PAUSED monitors
    pub monitors_down: usize,
    pub average_uptime: f64,
    /// Mean over UP monitors that reported a response time
    pub average_response_time: f64,
    pub monitors: Vec<MonitorRecord>,
}

impl SyncSummary {
    pub fn new(monitors: Vec<MonitorRecord>, last_updated: DateTime<Utc>) -> Self {
        let monitors_up = monitors.iter().filter(|m| m.is_up()).count();
        let monitors_down = monitors
            .iter()
            .filter(|m| {
                matches!(m.status, MonitorStatus::Down | MonitorStatus::SeemsDown | MonitorStatus::Paused)
            })
            .count();

        let uptimes: Vec<f64> = monitors.iter().map(|m| m.uptime_percentage).collect();
        let responses: Vec<f64> = monitors
            .iter()
            .filter(|m| m.is_up() && m.response_time_ms > 0)
            .map(|m| m.response_time_ms as f64)
            .collect();

        Self {
            last_updated,
            total_monitors: monitors.len(),
            monitors_up,
            monitors_down,
            average_uptime: rounded_mean(&uptimes),
            average_response_time: rounded_mean(&responses),
            monitors,
        }
    }
}

fn rounded_mean(values: &[f64]) -> f64 {
    netprobe::stats::round_to(netprobe::stats::mean(values), 2)
}

/// Verify the account, fetch every monitor and persist the normalized records
pub async fn run_sync(
    client: &UptimeRobotClient,
    request_delay: Duration,
    data_dir: &Path,
) -> Result<SyncSummary, AppError> {
    let layout = DataLayout::sync(data_dir);
    info!(key = %client.key_prefix(), "Starting UptimeRobot sync");

    let account = client.account_details().await?;
    info!(
        email = account.email.as_deref().unwrap_or("unknown"),
        monitor_limit = ?account.monitor_limit,
        monitor_interval = ?account.monitor_interval,
        up = ?account.up_monitors,
        down = ?account.down_monitors,
        paused = ?account.paused_monitors,
        "API key verified"
    );

    if !request_delay.is_zero() {
        tokio::time::sleep(request_delay).await;
    }

    let monitors = client.monitors().await?;
    let now = Utc::now();

    if monitors.is_empty() {
        warn!("No monitors found, writing an empty summary");
        let summary = SyncSummary::new(Vec::new(), now);
        write_summary(&layout.summary, &summary)?;
        return Ok(summary);
    }

    let interval = account.monitor_interval.unwrap_or(DEFAULT_MONITOR_INTERVAL);
    let records: Vec<MonitorRecord> = monitors
        .iter()
        .map(|monitor| MonitorRecord::from_monitor(monitor, interval, now))
        .collect();

    for record in &records {
        info!(
            monitor = %record.friendly_name,
            status = %record.status,
            uptime = record.uptime_percentage,
            response_ms = record.response_time_ms,
            "Monitor"
        );
    }

    let daily_log = DailyLog::new(&layout.daily_dir);
    daily_log.check(now.date_naive())?;

    let csv = CsvLog::new(&layout.csv);
    csv.append(&records)?;
    debug!(path = %csv.path().display(), rows = records.len(), "Appended CSV rows");
    let daily = daily_log.append(now.date_naive(), &records)?;

    let summary = SyncSummary::new(records, now);
    write_summary(&layout.summary, &summary)?;

    let count = |status: MonitorStatus| summary.monitors.iter().filter(|m| m.status == status).count();
    info!(
        up = summary.monitors_up,
        down = count(MonitorStatus::Down) + count(MonitorStatus::SeemsDown),
        paused = count(MonitorStatus::Paused),
        daily_entries = daily,
        "Sync complete"
    );

    Ok(summary)
}
