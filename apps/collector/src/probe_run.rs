//! Probe run: measure every configured target once and persist the results.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use netprobe::{Measurement, Prober, Target};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::error::AppError;
use crate::storage::{CsvLog, CsvRecord, DailyLog, DataLayout, write_summary};

impl CsvRecord for Measurement {
    const HEADER: &'static [&'static str] = &[
        "name",
        "address",
        "status",
        "avg_latency",
        "jitter",
        "packet_loss",
        "quality_score",
        "method",
        "timestamp",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.name().to_string(),
            self.address().to_string(),
            self.status().to_string(),
            self.avg_latency().to_string(),
            self.jitter().to_string(),
            self.packet_loss().to_string(),
            self.quality_score().to_string(),
            self.method().to_string(),
            self.timestamp().to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ]
    }
}

/// Aggregate of one probe run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSummary {
    pub last_updated: DateTime<Utc>,
    pub total_targets: usize,
    pub targets_up: usize,
    pub targets_down: usize,
    /// Mean latency of UP targets
    pub average_latency: f64,
    pub average_quality: f64,
    pub results: Vec<Measurement>,
}

impl ProbeSummary {
    pub fn new(results: Vec<Measurement>, last_updated: DateTime<Utc>) -> Self {
        let up: Vec<f64> = results.iter().filter(|m| m.is_up()).map(|m| m.avg_latency()).collect();
        let quality: Vec<f64> = results.iter().map(|m| m.quality_score()).collect();

        Self {
            last_updated,
            total_targets: results.len(),
            targets_up: up.len(),
            targets_down: results.len() - up.len(),
            average_latency: netprobe::stats::round_to(netprobe::stats::mean(&up), 2),
            average_quality: netprobe::stats::round_to(netprobe::stats::mean(&quality), 1),
            results,
        }
    }
}

/// Keep only the targets named in `names`, or all of them when it is empty
pub fn select_targets(targets: Vec<Target>, names: &[String]) -> Result<Vec<Target>, ConfigError> {
    if let Some(unknown) = names.iter().find(|name| !targets.iter().any(|t| t.name() == name.as_str())) {
        return Err(ConfigError::Invalid(format!("no target named {unknown:?}")));
    }

    let selected: Vec<Target> = if names.is_empty() {
        targets
    } else {
        targets.into_iter().filter(|t| names.iter().any(|n| n == t.name())).collect()
    };

    if selected.is_empty() {
        return Err(ConfigError::Invalid("no targets configured".into()));
    }
    Ok(selected)
}

/// Probe `targets` one after another and write the results under `data_dir`.
///
/// Unreachable targets are recorded as DOWN; only persistence failures and
/// an invalid sample count end the run with an error.
pub async fn run_probe(
    prober: &Prober,
    targets: &[Target],
    sample_count: u32,
    data_dir: &Path,
) -> Result<ProbeSummary, AppError> {
    let layout = DataLayout::probe(data_dir);
    info!(targets = targets.len(), samples = sample_count, "Starting probe run");

    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let measurement = prober.probe(target, sample_count).await?;
        info!(
            name = measurement.name(),
            address = measurement.address(),
            status = %measurement.status(),
            method = %measurement.method(),
            latency_ms = measurement.avg_latency(),
            quality = measurement.quality_score(),
            "Probed"
        );
        results.push(measurement);
    }

    let now = Utc::now();
    let daily = DailyLog::new(&layout.daily_dir);
    // a corrupt daily file must fail the run before the CSV gains any rows
    daily.check(now.date_naive())?;

    let csv = CsvLog::new(&layout.csv);
    csv.append(&results)?;
    debug!(path = %csv.path().display(), rows = results.len(), "Appended CSV rows");
    let entries = daily.append(now.date_naive(), &results)?;
    debug!(entries, "Updated daily log");

    let summary = ProbeSummary::new(results, now);
    write_summary(&layout.summary, &summary)?;

    info!(
        up = summary.targets_up,
        down = summary.targets_down,
        average_quality = summary.average_quality,
        "Probe run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;
    use netprobe::{Capability, Method, Metrics, Strategy, StrategyError};

    use super::*;
    use crate::storage::StorageError;

    /// Answers for 8.8.8.8 only, everything else times out
    struct OnlyGoogle;

    #[async_trait]
    impl Strategy for OnlyGoogle {
        fn capability(&self) -> Capability {
            Capability::Ping
        }

        fn applies_to(&self, _target: &Target) -> bool {
            true
        }

        async fn attempt(&self, target: &Target, sample_count: u32) -> Result<Metrics, StrategyError> {
            if target.address() == "8.8.8.8" {
                netprobe::stats::summarize_replies(sample_count, &[10.0, 12.0, 11.0, 13.0, 14.0])
                    .ok_or(StrategyError::NoReplies { sent: sample_count })
            } else {
                Err(StrategyError::Timeout(std::time::Duration::from_secs(60)))
            }
        }
    }

    fn targets() -> Vec<Target> {
        vec![Target::new("Google", "8.8.8.8"), Target::new("Quad9", "9.9.9.9")]
    }

    #[test]
    fn test_measurement_csv_fields() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 6, 30, 0).unwrap();
        let m = Measurement::reachable_at(
            &Target::new("Google", "8.8.8.8"),
            Metrics { avg_latency_ms: 12.0, jitter_ms: 1.58, packet_loss_pct: 0.0 },
            Method::Ping,
            at,
        );

        assert_eq!(
            m.fields(),
            vec!["Google", "8.8.8.8", "UP", "12", "1.58", "0", "96.8", "PING", "2026-10-17T06:30:00Z"]
        );
    }

    #[test]
    fn test_summary_averages_up_targets() {
        let at = Utc::now();
        let summary = ProbeSummary::new(
            vec![
                Measurement::reachable_at(&targets()[0], Metrics::single(20.0), Method::Ping, at),
                Measurement::reachable_at(&targets()[0], Metrics::single(40.0), Method::Http, at),
                Measurement::unreachable_at(&targets()[1], at),
            ],
            at,
        );

        assert_eq!(summary.total_targets, 3);
        assert_eq!(summary.targets_up, 2);
        assert_eq!(summary.targets_down, 1);
        assert_eq!(summary.average_latency, 30.0);
        assert_eq!(summary.average_quality, 66.7);
    }

    #[test]
    fn test_select_targets() {
        assert_eq!(select_targets(targets(), &[]).unwrap().len(), 2);

        let only = select_targets(targets(), &["Quad9".to_string()]).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name(), "Quad9");

        assert!(select_targets(targets(), &["Cloudflare".to_string()]).is_err());
        assert!(select_targets(Vec::new(), &[]).is_err());
    }

    #[tokio::test]
    async fn test_run_probe_persists_everything() {
        let dir = tempfile::tempdir().unwrap();
        let prober = Prober::new(vec![Box::new(OnlyGoogle)]);

        let summary = run_probe(&prober, &targets(), 5, dir.path()).await.unwrap();
        assert_eq!(summary.targets_up, 1);
        assert_eq!(summary.targets_down, 1);
        assert_eq!(summary.average_latency, 12.0);

        // a second run appends instead of replacing
        run_probe(&prober, &targets(), 5, dir.path()).await.unwrap();

        let csv = std::fs::read_to_string(dir.path().join("logs.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("name,address,status"));
        assert!(lines[2].starts_with("Quad9,9.9.9.9,DOWN,0,0,100,0,FAILED,"));

        let day = Utc::now().format("%Y-%m-%d").to_string();
        let daily: Vec<serde_json::Value> = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(format!("logs/{day}.json"))).unwrap(),
        )
        .unwrap();
        assert_eq!(daily.len(), 4);

        let stored: ProbeSummary = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(stored.total_targets, 2);
    }

    #[tokio::test]
    async fn test_corrupt_daily_log_leaves_csv_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let prober = Prober::new(vec![Box::new(OnlyGoogle)]);
        let logs = dir.path().join("logs");
        std::fs::create_dir_all(&logs).unwrap();
        let day = Utc::now().format("%Y-%m-%d").to_string();
        std::fs::write(logs.join(format!("{day}.json")), r#"{"not": "an array"}"#).unwrap();

        let result = run_probe(&prober, &targets(), 5, dir.path()).await;

        assert!(matches!(result, Err(AppError::Storage(StorageError::Corrupt { .. }))));
        assert!(!dir.path().join("logs.csv").exists());
        assert!(!dir.path().join("summary.json").exists());
    }

    #[tokio::test]
    async fn test_run_probe_rejects_zero_samples() {
        let dir = tempfile::tempdir().unwrap();
        let prober = Prober::new(vec![Box::new(OnlyGoogle)]);

        let result = run_probe(&prober, &targets(), 0, dir.path()).await;

        assert!(matches!(result, Err(AppError::Probe(_))));
        assert!(!dir.path().join("logs.csv").exists());
    }
}
