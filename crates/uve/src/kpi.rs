//! The KPI link-score (Mean Opinion Score derived) computation used by the
//! SLA-report aggregators.

/// Device-reported sentinel values meaning "unknown"; any of these on an
/// input suppresses the score entirely.
pub const RTT_UNKNOWN: i64 = 4_294_967_295;
/// Sentinel for jitter.
pub const JITTER_UNKNOWN: i64 = 4_294_967_295;
/// Sentinel for packet loss.
pub const PACKET_LOSS_UNKNOWN: i64 = 255;

/// Coefficients governing the link-score calculation, each a percentage
/// scaled by 100 (so `100` means "1.0x"); a value of `0` means "use the
/// spec default" for that coefficient.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkScoreCoefficients {
    /// Effective-latency threshold, in milliseconds, above which the
    /// steeper degradation curve applies. Default `160`.
    pub effective_latency_threshold: i64,
    /// Latency weighting factor. Default `100`.
    pub latency_factor: i64,
    /// Jitter weighting factor. Default `200`.
    pub jitter_factor: i64,
    /// Packet-loss weighting factor. Default `250`.
    pub packet_loss_factor: i64,
}

/// Computes the reported link score (`MOS * 20`) from latency/jitter/loss
/// inputs (all already halved/adjusted by the caller, as the aggregators
/// require), or `None` if any input carries its sentinel "unknown" value.
///
/// `latency` and `jitter` are in microseconds; `packet_loss` is a raw
/// percentage point count (already observed to range 0-100, since `255` is
/// the sentinel).
pub fn calculate_link_score(latency: i64, packet_loss: i64, jitter: i64, coefficients: LinkScoreCoefficients) -> Option<f64> {
    if latency == RTT_UNKNOWN || jitter == JITTER_UNKNOWN || packet_loss == PACKET_LOSS_UNKNOWN {
        return None;
    }

    let effective_latency_threshold = if coefficients.effective_latency_threshold == 0 {
        160
    } else {
        coefficients.effective_latency_threshold
    };
    let latency_factor = if coefficients.latency_factor == 0 { 100 } else { coefficients.latency_factor };
    let jitter_factor = if coefficients.jitter_factor == 0 { 200 } else { coefficients.jitter_factor };
    let packet_loss_factor = if coefficients.packet_loss_factor == 0 { 250 } else { coefficients.packet_loss_factor };

    let latency_ms = (latency / 1000) as f64;
    let jitter_ms = (jitter / 1000) as f64;

    let effective_latency = latency_ms * (latency_factor as f64 / 100.0) + (jitter_factor as f64 / 100.0) * jitter_ms + 10.0;

    let mut r_factor = if effective_latency < effective_latency_threshold as f64 {
        93.2 - (effective_latency / 40.0)
    } else {
        93.2 - (effective_latency - 120.0) / 10.0
    };

    r_factor -= packet_loss as f64 * (packet_loss_factor as f64 / 100.0);

    let mos = if r_factor < 0.0 {
        1.0
    } else if r_factor > 0.0 && r_factor < 100.0 {
        1.0 + 0.035 * r_factor + 0.000_007 * r_factor * (r_factor - 60.0) * (100.0 - r_factor)
    } else {
        4.5
    };

    Some(mos * 20.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sentinel_inputs_suppress_the_score() {
        assert!(calculate_link_score(RTT_UNKNOWN, 1, 2000, LinkScoreCoefficients::default()).is_none());
        assert!(calculate_link_score(20_000, 1, JITTER_UNKNOWN, LinkScoreCoefficients::default()).is_none());
        assert!(calculate_link_score(20_000, PACKET_LOSS_UNKNOWN, 2000, LinkScoreCoefficients::default()).is_none());
    }

    #[test]
    fn defaults_applied_when_coefficients_are_zero() {
        // RTT/2 = 10_000us, jitter=2_000us, packet_loss=1%, all thresholds
        // zero -> effective latency 24ms -> R=90.1 -> MOS by interpolation
        // -> score ~86.8 (the caller halves RTT before calling this).
        let score = calculate_link_score(10_000, 1, 2_000, LinkScoreCoefficients::default()).unwrap();
        assert!((score - 86.8).abs() <= 1.0, "score was {score}");
    }

    #[test]
    fn score_is_bounded_for_finite_inputs() {
        for latency in [0, 1_000, 50_000, 200_000] {
            for jitter in [0, 500, 10_000] {
                for loss in [0, 1, 50, 99] {
                    let score = calculate_link_score(latency, loss, jitter, LinkScoreCoefficients::default()).unwrap();
                    assert!((0.0..=90.0).contains(&score), "score {score} out of bounds for ({latency},{loss},{jitter})");
                }
            }
        }
    }
}
