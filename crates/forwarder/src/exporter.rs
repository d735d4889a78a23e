//! The `AsyncExporter` that mirrors decorated syslog records to stream
//! destinations and/or the message bus.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use collector_model::{CollectorEvent, FieldValue};
use collector_settings::MessageTypeTable;
use exporter::{AsyncExporter, ConcurrencyModel, EngineHandler, Error, ExporterBuilder, ExporterFactory};
use serde_json::{Map, Value};
use serde_yaml::Value as YamlValue;
use signal::{Signal, SignalReceiver};

use crate::bus::MessageBusSink;
use crate::config::ForwarderConfig;
use crate::stream::StreamSink;

/// Encodes a decorated record's fields as the JSON object the message bus
/// expects: every value typed as a string or an unsigned 64-bit integer
/// (spec §6). Negative integers and floats, which the bus payload has no
/// slot for, fall back to their string rendering.
pub fn encode_bus_payload(record: &collector_model::record::SyslogRecord) -> Vec<u8> {
    let mut object = Map::new();
    for (key, value) in &record.fields {
        let json_value = match value {
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::Int(i) if *i >= 0 => Value::Number((*i as u64).into()),
            other => Value::String(other.as_str_lossy()),
        };
        let _ = object.insert(key.clone(), json_value);
    }
    serde_json::to_vec(&Value::Object(object)).unwrap_or_default()
}

/// Mirrors every decorated [`CollectorEvent::Syslog`] whose tag is flagged
/// `forward` in the [`MessageTypeTable`] to each configured stream
/// destination (byte-accurate `forward_buf`) and, when configured, to the
/// injected [`MessageBusSink`] as a JSON object keyed by the record's
/// `hostname`.
pub struct ForwarderExporter {
    name: String,
    streams: Vec<StreamSink>,
    bus: Option<Arc<dyn MessageBusSink>>,
    publish_to_message_bus: bool,
    message_types: MessageTypeTable,
    reconnect_interval: Duration,
}

impl ForwarderExporter {
    /// Creates an exporter mirroring to `config.stream_destinations` and,
    /// when `config.publish_to_message_bus`, to `bus`.
    pub fn new(name: String, config: ForwarderConfig, bus: Option<Arc<dyn MessageBusSink>>, message_types: MessageTypeTable) -> Self {
        Self {
            name,
            streams: config.stream_destinations.into_iter().map(|d| StreamSink::new(d.address)).collect(),
            bus,
            publish_to_message_bus: config.publish_to_message_bus,
            message_types,
            reconnect_interval: Duration::from_secs(config.reconnect_interval_secs),
        }
    }

    async fn mirror(&mut self, record: &collector_model::record::SyslogRecord) {
        if !self.message_types.get(&record.tag).forward {
            return;
        }

        for sink in &mut self.streams {
            if !sink.is_connected() {
                continue;
            }
            if !sink.send(&record.forward_buf).await {
                tracing::warn!(address = sink.address(), tag = %record.tag, "forwarder dropped a frame: destination disconnected");
            }
        }

        if self.publish_to_message_bus {
            if let Some(bus) = &self.bus {
                let payload = encode_bus_payload(record);
                if let Err(error) = bus.send(&record.hostname, payload).await {
                    tracing::warn!(%error, hostname = %record.hostname, "forwarder message-bus publish failed");
                }
            }
        }
    }

    async fn reconnect_all(&mut self) {
        for sink in &mut self.streams {
            if !sink.is_connected() {
                sink.reconnect().await;
            }
        }
    }
}

#[async_trait]
impl AsyncExporter<CollectorEvent> for ForwarderExporter {
    async fn init(&mut self, engine_handler: &mut EngineHandler) -> Result<(), Error> {
        engine_handler.timer(self.reconnect_interval);
        self.reconnect_all().await;
        Ok(())
    }

    async fn export(&mut self, mut signal_receiver: SignalReceiver<CollectorEvent>, _effect_handler: exporter::effect::EffectHandler<CollectorEvent>) -> Result<(), Error> {
        loop {
            match signal_receiver.recv().await {
                Signal::Messages { messages } => {
                    for message in &messages {
                        if let Some(record) = message.as_syslog() {
                            self.mirror(record).await;
                        }
                    }
                }
                Signal::TimerTick { .. } => self.reconnect_all().await,
                Signal::Stop => {
                    tracing::info!(exporter = %self.name, "forwarder exporter stopping");
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Builds [`ForwarderExporter`] instances sharing one optional
/// [`MessageBusSink`] and [`MessageTypeTable`].
pub struct ForwarderExporterFactory {
    bus: Option<Arc<dyn MessageBusSink>>,
    message_types: MessageTypeTable,
}

impl ForwarderExporterFactory {
    /// Creates a factory handing `bus`/`message_types` to every exporter it
    /// builds.
    pub fn new(bus: Option<Arc<dyn MessageBusSink>>, message_types: MessageTypeTable) -> Self {
        Self { bus, message_types }
    }
}

struct ForwarderExporterBuilder {
    name: String,
    config: ForwarderConfig,
    bus: Option<Arc<dyn MessageBusSink>>,
    message_types: MessageTypeTable,
}

impl ExporterBuilder<CollectorEvent> for ForwarderExporterBuilder {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn r#type(&self) -> String {
        "forwarder".into()
    }

    fn concurrency_model(&self) -> ConcurrencyModel {
        ConcurrencyModel::Singleton
    }

    fn build(&self) -> Result<Box<dyn AsyncExporter<CollectorEvent> + Send + Sync>, Error> {
        Ok(Box::new(ForwarderExporter::new(
            self.name.clone(),
            self.config.clone(),
            self.bus.clone(),
            self.message_types.clone(),
        )))
    }
}

impl ExporterFactory<CollectorEvent> for ForwarderExporterFactory {
    fn builder(&self, exporter_name: &str, exporter_type: &str, config: YamlValue) -> Option<Box<dyn ExporterBuilder<CollectorEvent> + Send + Sync>> {
        if exporter_type != "forwarder" {
            return None;
        }
        let config: ForwarderConfig = if config.is_null() {
            ForwarderConfig::default()
        } else {
            serde_yaml::from_value(config).ok()?
        };
        Some(Box::new(ForwarderExporterBuilder {
            name: exporter_name.to_string(),
            config,
            bus: self.bus.clone(),
            message_types: self.message_types.clone(),
        }))
    }
}

#[cfg(test)]
mod test {
    use collector_model::{MessageTypeConfig, SyslogRecord};
    use collector_settings::MessageTypeTable;

    use super::*;

    #[test]
    fn bus_payload_encodes_non_negative_ints_as_numbers() {
        let mut record = SyslogRecord::new(0, "h", "TAG");
        let _ = record.fields.insert("count".to_string(), FieldValue::Int(5));
        let _ = record.fields.insert("name".to_string(), FieldValue::Str("x".to_string()));
        let _ = record.fields.insert("ratio".to_string(), FieldValue::Float(1.5));
        let bytes = encode_bus_payload(&record);
        let value: Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(value["count"], Value::Number(5u64.into()));
        assert_eq!(value["name"], Value::String("x".to_string()));
        assert_eq!(value["ratio"], Value::String("1.5".to_string()));
    }

    #[test]
    fn negative_int_falls_back_to_string() {
        let mut record = SyslogRecord::new(0, "h", "TAG");
        let _ = record.fields.insert("delta".to_string(), FieldValue::Int(-3));
        let bytes = encode_bus_payload(&record);
        let value: Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(value["delta"], Value::String("-3".to_string()));
    }

    #[tokio::test]
    async fn mirror_skips_tags_not_flagged_for_forwarding() {
        let message_types = MessageTypeTable::new();
        message_types.set("NOFWD".to_string(), MessageTypeConfig::disabled("NOFWD"));
        let mut exporter = ForwarderExporter::new("fwd".to_string(), ForwarderConfig::default(), None, message_types);
        let record = SyslogRecord::new(0, "h", "NOFWD");
        // No sinks configured; this only verifies the early-return path
        // does not panic and leaves no connected sinks to report against.
        exporter.mirror(&record).await;
        assert!(exporter.streams.is_empty());
    }
}
