//! Watermark tuples used by the admission controller.

use serde::{Deserialize, Serialize};

/// Drop severity levels a message can be assigned. Ordering matters:
/// `SL0 < SL1 < SL2`, and the admission controller's drop decision is
/// monotonic in this ordering (see `WaterMarkTuple::severity_for`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Least severe / always admitted unless every signal is clear.
    Sl0,
    /// Intermediate severity.
    Sl1,
    /// Most severe.
    Sl2,
}

/// One `(threshold, severity)` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdSeverity {
    /// The signal value at which this severity becomes active.
    pub threshold: f64,
    /// The severity reached once the threshold is crossed.
    pub severity: Severity,
}

/// An ordered list of `(threshold, severity)` pairs for one observable
/// signal (queue depth, disk usage percent, pending compactions), with
/// separate high and low sets to provide hysteresis: a signal that rose
/// past a high threshold only drops back down once it falls below the
/// corresponding low threshold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaterMarkTuple {
    /// Thresholds crossed while the signal is rising.
    pub high: Vec<ThresholdSeverity>,
    /// Thresholds crossed while the signal is falling.
    pub low: Vec<ThresholdSeverity>,
}

impl WaterMarkTuple {
    /// Computes the severity level reached by `value` rising through the
    /// high set, given the `previous` drop level (for hysteresis: a rising
    /// signal only escalates, a falling one only de-escalates once it
    /// crosses the matching low threshold).
    pub fn next_severity(&self, previous: Option<Severity>, value: f64, was_rising: bool) -> Option<Severity> {
        let set = if was_rising { &self.high } else { &self.low };
        let mut reached = None;
        for ts in set {
            let crossed = if was_rising {
                value >= ts.threshold
            } else {
                value <= ts.threshold
            };
            if crossed {
                reached = Some(match reached {
                    Some(current) if current >= ts.severity => current,
                    _ => ts.severity,
                });
            }
        }
        if was_rising {
            // Escalation only ever raises the drop level.
            match (previous, reached) {
                (Some(prev), Some(new)) => Some(prev.max(new)),
                (None, Some(new)) => Some(new),
                (prev, None) => prev,
            }
        } else {
            // De-escalation: drop level falls only to the severity whose low
            // threshold was actually crossed; otherwise hysteresis holds it.
            reached.or(previous)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tuple() -> WaterMarkTuple {
        WaterMarkTuple {
            high: vec![
                ThresholdSeverity {
                    threshold: 85.0,
                    severity: Severity::Sl1,
                },
                ThresholdSeverity {
                    threshold: 95.0,
                    severity: Severity::Sl2,
                },
            ],
            low: vec![
                ThresholdSeverity {
                    threshold: 80.0,
                    severity: Severity::Sl1,
                },
                ThresholdSeverity {
                    threshold: 90.0,
                    severity: Severity::Sl2,
                },
            ],
        }
    }

    #[test]
    fn escalates_through_both_high_thresholds() {
        let wm = tuple();
        let after_first = wm.next_severity(None, 87.0, true);
        assert_eq!(after_first, Some(Severity::Sl1));
        let after_second = wm.next_severity(after_first, 96.0, true);
        assert_eq!(after_second, Some(Severity::Sl2));
    }
}
