//! The `AsyncProcessor` that drops messages under write pressure before
//! they reach the aggregator or the table writer.

use std::sync::Arc;

use async_trait::async_trait;
use collector_model::{CollectorEvent, Severity};
use collector_settings::WriteSwitches;
use processor::{AsyncProcessor, EffectHandler, Error};
use serde_yaml::Value as YamlValue;
use signal::Signal;

use crate::category::{classify, Category};
use crate::watermarks::WatermarkEngine;

/// Derives the message's own severity tier from its syslog `level` field
/// (standard syslog numbering, lower is more severe), banding it onto the
/// three admission severities so higher-numbered, lower-priority levels are
/// the first ones shed under pressure. UVE metrics, which carry no syslog
/// level, are always treated as [`Severity::Sl1`].
fn severity_of(event: &CollectorEvent) -> Severity {
    match event {
        CollectorEvent::Metric(_) => Severity::Sl1,
        CollectorEvent::Syslog(record) => match record.int_field("level", 4) {
            0..=2 => Severity::Sl0,
            3..=4 => Severity::Sl1,
            _ => Severity::Sl2,
        },
    }
}

/// Combines the watermark engine's effective drop level, per-category
/// overrides and the global write switches into one admit/drop decision.
pub struct AdmissionProcessor {
    name: String,
    watermarks: Arc<WatermarkEngine>,
    write_switches: WriteSwitches,
}

impl AdmissionProcessor {
    /// Creates a processor gating on `watermarks` and `write_switches`.
    pub fn new(name: String, watermarks: Arc<WatermarkEngine>, write_switches: WriteSwitches) -> Self {
        Self {
            name,
            watermarks,
            write_switches,
        }
    }

    fn admits(&self, event: &CollectorEvent) -> bool {
        if self.write_switches.disable_all_db_writes {
            return false;
        }

        let category = classify(event);
        if category == Category::Flow {
            return false;
        }
        if category == Category::Uve && self.write_switches.disable_db_stats_writes {
            return false;
        }
        if matches!(category, Category::System | Category::Object | Category::Session) && self.write_switches.disable_db_messages_writes {
            return false;
        }

        if !category.participates_in_severity_check() {
            return true;
        }

        match self.watermarks.effective_drop_level() {
            Some(drop_level) => severity_of(event) < drop_level,
            None => true,
        }
    }
}

#[async_trait]
impl AsyncProcessor<CollectorEvent> for AdmissionProcessor {
    async fn process(&mut self, signal: Signal<CollectorEvent>, effect_handler: &mut EffectHandler<CollectorEvent>) -> Result<(), Error> {
        match signal {
            Signal::Messages { messages } => {
                let admitted: Vec<CollectorEvent> = messages.into_iter().filter(|event| self.admits(event)).collect();
                effect_handler.emit_messages(admitted);
                Ok(())
            }
            Signal::TimerTick { .. } | Signal::Stop => Ok(()),
            _ => Err(Error::UnsupportedEvent {
                processor: self.name.clone(),
                signal: signal.to_string(),
            }),
        }
    }
}

/// Builds [`AdmissionProcessor`] instances sharing one [`WatermarkEngine`].
pub struct AdmissionProcessorFactory {
    watermarks: Arc<WatermarkEngine>,
    write_switches: WriteSwitches,
}

impl AdmissionProcessorFactory {
    /// Creates a factory handing `watermarks`/`write_switches` to every
    /// processor it builds.
    pub fn new(watermarks: Arc<WatermarkEngine>, write_switches: WriteSwitches) -> Self {
        Self {
            watermarks,
            write_switches,
        }
    }
}

impl processor::ProcessorFactory<CollectorEvent> for AdmissionProcessorFactory {
    fn create(
        &self,
        processor_name: &str,
        processor_type: &str,
        _config: YamlValue,
    ) -> Result<Box<dyn AsyncProcessor<CollectorEvent> + Send + Sync>, Error> {
        match processor_type {
            "admission" => Ok(Box::new(AdmissionProcessor::new(
                processor_name.to_string(),
                self.watermarks.clone(),
                self.write_switches,
            ))),
            _ => Err(Error::UnknownProcessor {
                processor: processor_name.into(),
                r#type: processor_type.into(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use collector_model::SyslogRecord;
    use collector_settings::StartupConfig;

    use super::*;

    fn flow_event() -> CollectorEvent {
        CollectorEvent::Syslog(SyslogRecord::new(0, "h", "FLOW"))
    }

    fn system_event(level: i64) -> CollectorEvent {
        let mut record = SyslogRecord::new(0, "h", "SomeSystemTag");
        record.fields.insert("type".to_string(), collector_model::FieldValue::Str("SYSTEM".to_string()));
        record.fields.insert("level".to_string(), collector_model::FieldValue::Int(level));
        CollectorEvent::Syslog(record)
    }

    #[test]
    fn flow_is_always_dropped() {
        let watermarks = Arc::new(WatermarkEngine::new(Default::default()));
        let processor = AdmissionProcessor::new("admission".to_string(), watermarks, WriteSwitches::default());
        assert!(!processor.admits(&flow_event()));
    }

    #[test]
    fn global_switch_drops_everything() {
        let watermarks = Arc::new(WatermarkEngine::new(Default::default()));
        let switches = WriteSwitches {
            disable_all_db_writes: true,
            ..Default::default()
        };
        let processor = AdmissionProcessor::new("admission".to_string(), watermarks, switches);
        assert!(!processor.admits(&system_event(0)));
    }

    #[test]
    fn low_priority_message_dropped_once_watermark_escalates() {
        use collector_model::{Severity, ThresholdSeverity, WaterMarkTuple};
        let settings = collector_settings::WatermarkSettings {
            queue_depth: WaterMarkTuple {
                high: vec![ThresholdSeverity {
                    threshold: 10.0,
                    severity: Severity::Sl2,
                }],
                low: vec![],
            },
            ..Default::default()
        };
        let watermarks = Arc::new(WatermarkEngine::new(settings));
        watermarks.update_queue_depth(20.0);

        let processor = AdmissionProcessor::new("admission".to_string(), watermarks, WriteSwitches::default());
        assert!(processor.admits(&system_event(1)), "high-priority message should survive");
        assert!(!processor.admits(&system_event(7)), "low-priority message should be shed");
    }

    #[test]
    fn startup_config_round_trips_through_watermark_settings() {
        let _ = StartupConfig::default;
    }
}
