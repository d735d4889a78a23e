//! The watermark engine: three independently-tracked signals, each owning a
//! high/low `WaterMarkTuple`, combined into one effective drop severity.

use std::sync::Mutex;

use collector_model::{Severity, WaterMarkTuple};
use collector_settings::WatermarkSettings;

/// Last observed value and current drop level for one monitored signal.
#[derive(Debug, Default)]
struct SignalState {
    last_value: f64,
    drop_level: Option<Severity>,
}

/// Tracks queue depth, disk-usage percentage and pending-compaction count,
/// each against its own [`WaterMarkTuple`], and exposes the minimum
/// (most-aggressive-wins) drop level across all three.
pub struct WatermarkEngine {
    queue_depth: WaterMarkTuple,
    disk_usage_pct: WaterMarkTuple,
    pending_compactions: WaterMarkTuple,
    queue_depth_state: Mutex<SignalState>,
    disk_usage_state: Mutex<SignalState>,
    pending_compactions_state: Mutex<SignalState>,
}

impl WatermarkEngine {
    /// Creates an engine over the three signal tuples from startup settings.
    /// Every signal starts with no drop level (fully admitting) until its
    /// first update.
    pub fn new(settings: WatermarkSettings) -> Self {
        Self {
            queue_depth: settings.queue_depth,
            disk_usage_pct: settings.disk_usage_pct,
            pending_compactions: settings.pending_compactions,
            queue_depth_state: Mutex::new(SignalState::default()),
            disk_usage_state: Mutex::new(SignalState::default()),
            pending_compactions_state: Mutex::new(SignalState::default()),
        }
    }

    /// Reports a new queue-depth reading.
    pub fn update_queue_depth(&self, value: f64) {
        Self::update(&self.queue_depth, &self.queue_depth_state, value);
    }

    /// Reports a new disk-usage-percentage reading.
    pub fn update_disk_usage_pct(&self, value: f64) {
        Self::update(&self.disk_usage_pct, &self.disk_usage_state, value);
    }

    /// Reports a new pending-compactions reading.
    pub fn update_pending_compactions(&self, value: f64) {
        Self::update(&self.pending_compactions, &self.pending_compactions_state, value);
    }

    fn update(tuple: &WaterMarkTuple, state: &Mutex<SignalState>, value: f64) {
        let mut state = state.lock().expect("watermark signal lock poisoned");
        let was_rising = value >= state.last_value;
        state.drop_level = tuple.next_severity(state.drop_level, value, was_rising);
        state.last_value = value;
    }

    /// The effective drop level: a message drops once it meets *any*
    /// signal's level (`drop = (s >= queue) || (s >= disk) || (s >=
    /// compaction)`), so the signal currently demanding the least-severe
    /// cutoff is the one that governs — the minimum across the three
    /// active levels, or `None` if every signal is clear.
    pub fn effective_drop_level(&self) -> Option<Severity> {
        [&self.queue_depth_state, &self.disk_usage_state, &self.pending_compactions_state]
            .iter()
            .filter_map(|state| state.lock().expect("watermark signal lock poisoned").drop_level)
            .min()
    }
}

#[cfg(test)]
mod test {
    use collector_model::{Severity, ThresholdSeverity};

    use super::*;

    fn settings() -> WatermarkSettings {
        WatermarkSettings {
            queue_depth: WaterMarkTuple {
                high: vec![ThresholdSeverity {
                    threshold: 100.0,
                    severity: Severity::Sl1,
                }],
                low: vec![ThresholdSeverity {
                    threshold: 50.0,
                    severity: Severity::Sl1,
                }],
            },
            disk_usage_pct: WaterMarkTuple::default(),
            pending_compactions: WaterMarkTuple::default(),
        }
    }

    #[test]
    fn clear_until_a_signal_crosses_its_high_threshold() {
        let engine = WatermarkEngine::new(settings());
        assert_eq!(engine.effective_drop_level(), None);
        engine.update_queue_depth(150.0);
        assert_eq!(engine.effective_drop_level(), Some(Severity::Sl1));
    }

    #[test]
    fn effective_level_is_the_min_across_signals_so_the_most_aggressive_wins() {
        let engine = WatermarkEngine::new(WatermarkSettings {
            queue_depth: WaterMarkTuple {
                high: vec![ThresholdSeverity {
                    threshold: 10.0,
                    severity: Severity::Sl1,
                }],
                low: vec![],
            },
            disk_usage_pct: WaterMarkTuple {
                high: vec![ThresholdSeverity {
                    threshold: 90.0,
                    severity: Severity::Sl2,
                }],
                low: vec![],
            },
            pending_compactions: WaterMarkTuple::default(),
        });
        engine.update_queue_depth(20.0);
        engine.update_disk_usage_pct(95.0);
        // queue is at Sl1, disk is at Sl2; Sl1 is the more aggressive
        // (lower) cutoff, so it governs even though disk's own level is
        // more severe in isolation.
        assert_eq!(engine.effective_drop_level(), Some(Severity::Sl1));
    }

    #[test]
    fn escalating_queue_signal_lowers_the_effective_level_even_if_others_are_clear() {
        let engine = WatermarkEngine::new(WatermarkSettings {
            queue_depth: WaterMarkTuple {
                high: vec![ThresholdSeverity {
                    threshold: 10.0,
                    severity: Severity::Sl0,
                }],
                low: vec![],
            },
            disk_usage_pct: WaterMarkTuple::default(),
            pending_compactions: WaterMarkTuple::default(),
        });
        assert_eq!(engine.effective_drop_level(), None);
        engine.update_queue_depth(20.0);
        assert_eq!(engine.effective_drop_level(), Some(Severity::Sl0));
    }
}
