//! The `AsyncProcessor` that dispatches each decorated syslog record to its
//! `summarize_*` mode and emits the derived metrics.

use std::sync::Mutex;

use async_trait::async_trait;
use collector_model::CollectorEvent;
use collector_settings::MessageTypeTable;
use processor::{AsyncProcessor, EffectHandler, Error};
use serde_yaml::Value as YamlValue;
use signal::Signal;

use crate::cache::SessionCounterCache;
use crate::filters;
use crate::summarize;

/// Holds the session-counter cache across signals and dispatches every
/// syslog record it sees to the matching `summarize_*` mode, emitting the
/// original event unchanged plus zero or more derived `CollectorEvent::Metric`s.
pub struct UveProcessor {
    name: String,
    message_types: MessageTypeTable,
    cache: Mutex<SessionCounterCache>,
    process_vol_update: bool,
}

impl UveProcessor {
    /// Creates a processor backed by `message_types` (per-tag summarize
    /// flags) with a session-counter cache bounded to `max_sessions`
    /// entries. `process_vol_update` governs whether
    /// `APPTRACK_SESSION_VOL_UPDATE` messages are diffed or ignored.
    pub fn new(name: String, message_types: MessageTypeTable, max_sessions: usize, process_vol_update: bool) -> Self {
        Self {
            name,
            message_types,
            cache: Mutex::new(SessionCounterCache::new(max_sessions)),
            process_vol_update,
        }
    }

    fn summarize_one(&self, record: &collector_model::record::SyslogRecord) -> Vec<collector_model::metric::MetricRecord> {
        let config = self.message_types.get(&record.tag);
        if !config.process_and_summarize || filters::should_discard(record) {
            return Vec::new();
        }

        match record.tag.as_str() {
            "APPTRACK_SESSION_CLOSE" | "APPTRACK_SESSION_VOL_UPDATE" | "RT_FLOW_NEXTHOP_CHANGE" => {
                let mut cache = self.cache.lock().expect("session-counter cache lock poisoned");
                summarize::summarize_data(record, &mut cache, self.process_vol_update)
            }
            "APPQOE_BEST_PATH_SELECTED" => summarize::summarize_bps(record, config.process_and_summarize_user),
            "APPQOE_PASSIVE_SLA_METRIC_REPORT" | "APPQOE_APP_PASSIVE_SLA_METRIC_REPORT" => {
                summarize::summarize_psmr(record, config.process_and_summarize_user)
            }
            "APPQOE_ACTIVE_SLA_METRIC_REPORT" => summarize::summarize_asmr(record, config.process_and_summarize_user),
            "APPQOE_SLA_METRIC_VIOLATION" => summarize::summarize_smv(record, config.process_and_summarize_user),
            _ => Vec::new(),
        }
    }
}

#[async_trait]
impl AsyncProcessor<CollectorEvent> for UveProcessor {
    async fn process(&mut self, signal: Signal<CollectorEvent>, effect_handler: &mut EffectHandler<CollectorEvent>) -> Result<(), Error> {
        match signal {
            Signal::Messages { messages } => {
                let mut out = Vec::with_capacity(messages.len());
                for message in messages {
                    if let Some(record) = message.as_syslog() {
                        for metric in self.summarize_one(record) {
                            out.push(CollectorEvent::Metric(metric));
                        }
                    }
                    out.push(message);
                }
                effect_handler.emit_messages(out);
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

/// Builds [`UveProcessor`] instances sharing one [`MessageTypeTable`].
pub struct UveProcessorFactory {
    message_types: MessageTypeTable,
    max_sessions: usize,
    process_vol_update: bool,
}

impl UveProcessorFactory {
    /// Creates a factory handing `message_types` to every processor it
    /// builds, each with its own session-counter cache.
    pub fn new(message_types: MessageTypeTable, max_sessions: usize, process_vol_update: bool) -> Self {
        Self {
            message_types,
            max_sessions,
            process_vol_update,
        }
    }
}

impl processor::ProcessorFactory<CollectorEvent> for UveProcessorFactory {
    fn create(
        &self,
        processor_name: &str,
        processor_type: &str,
        _config: YamlValue,
    ) -> Result<Box<dyn AsyncProcessor<CollectorEvent> + Send + Sync>, Error> {
        match processor_type {
            "uve" => Ok(Box::new(UveProcessor::new(
                processor_name.to_string(),
                self.message_types.clone(),
                self.max_sessions,
                self.process_vol_update,
            ))),
            _ => Err(Error::UnknownProcessor {
                processor: processor_name.into(),
                r#type: processor_type.into(),
            }),
        }
    }
}
