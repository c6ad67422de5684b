//! Round-trip time statistics.

use crate::measurement::Metrics;

/// Arithmetic mean, 0 for an empty slice
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample standard deviation (n - 1 denominator), 0 for fewer than two samples
pub fn sample_std_dev(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let avg = mean(samples);
    let variance =
        samples.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    variance.sqrt()
}

/// Percentage of `sent` requests that got no reply
pub fn packet_loss(sent: u32, received: u32) -> f64 {
    if sent == 0 {
        return 100.0;
    }
    let received = received.min(sent);
    f64::from(sent - received) / f64::from(sent) * 100.0
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Reduce the reply times of one ping run to [`Metrics`].
///
/// Returns `None` when no reply came back.
pub fn summarize_replies(sent: u32, rtts: &[f64]) -> Option<Metrics> {
    if rtts.is_empty() {
        return None;
    }
    let received = u32::try_from(rtts.len()).unwrap_or(u32::MAX);

    Some(Metrics {
        avg_latency_ms: round_to(mean(rtts), 2),
        jitter_ms: round_to(sample_std_dev(rtts), 2),
        packet_loss_pct: round_to(packet_loss(sent, received), 2),
    })
}
