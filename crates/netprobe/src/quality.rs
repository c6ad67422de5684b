//! Link quality score.
//!
//! Packet loss dominates the score because it means an outage rather than
//! slowness. Jitter weighs more than raw latency, and latency below
//! [`LATENCY_FLOOR_MS`] is free.

use crate::stats::round_to;

/// Latency up to this value costs nothing
pub const LATENCY_FLOOR_MS: f64 = 50.0;
/// Points lost per millisecond above the floor
pub const LATENCY_WEIGHT: f64 = 0.5;
/// Points lost per millisecond of jitter
pub const JITTER_WEIGHT: f64 = 2.0;
/// Points lost per percent of packet loss
pub const LOSS_WEIGHT: f64 = 10.0;

const MAX_SCORE: f64 = 100.0;

/// Score a link from 0 (unusable) to 100, rounded to one decimal.
///
/// Negative or NaN latency and jitter count as 0. A NaN loss counts as total
/// loss.
pub fn quality_score(latency_ms: f64, jitter_ms: f64, packet_loss_pct: f64) -> f64 {
    if packet_loss_pct.is_nan() || packet_loss_pct >= 100.0 {
        return 0.0;
    }

    let latency = sanitize(latency_ms);
    let jitter = sanitize(jitter_ms);
    let loss = packet_loss_pct.max(0.0);

    let mut score = MAX_SCORE;
    if latency > LATENCY_FLOOR_MS {
        score -= (latency - LATENCY_FLOOR_MS) * LATENCY_WEIGHT;
    }
    score -= jitter * JITTER_WEIGHT;
    score -= loss * LOSS_WEIGHT;

    round_to(score.clamp(0.0, MAX_SCORE), 1)
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}
