//! Property checks for the quality score over a grid of inputs

use netprobe::quality_score;

const LATENCIES: [f64; 8] = [0.0, 12.5, 50.0, 50.1, 80.0, 150.0, 240.0, 400.0];
const JITTERS: [f64; 6] = [0.0, 0.4, 1.58, 5.0, 20.0, 60.0];
const LOSSES: [f64; 7] = [0.0, 0.5, 2.0, 20.0, 60.0, 99.9, 100.0];

#[test]
fn test_score_in_range() {
    for latency in LATENCIES {
        for jitter in JITTERS {
            for loss in LOSSES {
                let score = quality_score(latency, jitter, loss);
                assert!(
                    (0.0..=100.0).contains(&score),
                    "score {score} out of range for ({latency}, {jitter}, {loss})"
                );
            }
        }
    }
}

#[test]
fn test_total_loss_is_zero() {
    for latency in LATENCIES {
        for jitter in JITTERS {
            assert_eq!(quality_score(latency, jitter, 100.0), 0.0);
        }
    }
}

#[test]
fn test_non_increasing_in_latency() {
    for jitter in JITTERS {
        for loss in LOSSES {
            let scores: Vec<f64> = LATENCIES.iter().map(|&l| quality_score(l, jitter, loss)).collect();
            assert!(scores.windows(2).all(|w| w[1] <= w[0]), "latency: {scores:?}");
        }
    }
}

#[test]
fn test_non_increasing_in_jitter() {
    for latency in LATENCIES {
        for loss in LOSSES {
            let scores: Vec<f64> = JITTERS.iter().map(|&j| quality_score(latency, j, loss)).collect();
            assert!(scores.windows(2).all(|w| w[1] <= w[0]), "jitter: {scores:?}");
        }
    }
}

#[test]
fn test_non_increasing_in_loss() {
    for latency in LATENCIES {
        for jitter in JITTERS {
            let scores: Vec<f64> = LOSSES.iter().map(|&p| quality_score(latency, jitter, p)).collect();
            assert!(scores.windows(2).all(|w| w[1] <= w[0]), "loss: {scores:?}");
        }
    }
}

#[test]
fn test_latency_below_floor_is_free() {
    assert_eq!(quality_score(0.0, 0.0, 0.0), quality_score(50.0, 0.0, 0.0));
    assert_eq!(quality_score(50.0, 0.0, 0.0), 100.0);
    assert_eq!(quality_score(150.0, 5.0, 0.0), 40.0);
}
