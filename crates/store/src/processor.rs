//! The `AsyncProcessor` that assembles table rows and commits them through a
//! [`StoreDriver`], passing every event through unchanged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use collector_model::{CollectorEvent, IntrospectCounters, StoreDriver, TtlClass};
use collector_settings::MessageTypeTable;
use processor::{AsyncProcessor, EffectHandler, Error};
use serde_yaml::Value as YamlValue;
use signal::Signal;

use crate::field_names::FieldNamesCache;
use crate::tables;

const T2_BUCKET_SHIFT: u32 = 23;

fn current_t2() -> i64 {
    let micros = SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_micros() as i64;
    micros >> T2_BUCKET_SHIFT
}

/// Writes decorated syslog records and UVE metrics to the wide-column store
/// via a [`StoreDriver`] trait object, honoring each tag's
/// `process_and_store` flag and the field-names epoch dedup cache.
pub struct StoreProcessor {
    name: String,
    driver: Arc<dyn StoreDriver>,
    message_types: MessageTypeTable,
    field_names_cache: Mutex<FieldNamesCache>,
    counters: Arc<IntrospectCounters>,
    ttl_hours: HashMap<TtlClass, u32>,
}

impl StoreProcessor {
    /// Creates a processor writing through `driver`, consulting
    /// `message_types` for the per-tag `process_and_store` flag and
    /// `ttl_hours` for each table's per-class TTL.
    pub fn new(
        name: String,
        driver: Arc<dyn StoreDriver>,
        message_types: MessageTypeTable,
        counters: Arc<IntrospectCounters>,
        ttl_hours: HashMap<TtlClass, u32>,
    ) -> Self {
        Self {
            name,
            driver,
            message_types,
            field_names_cache: Mutex::new(FieldNamesCache::new()),
            counters,
            ttl_hours,
        }
    }

    fn object_names(&self, record: &collector_model::record::SyslogRecord, config: &collector_model::MessageTypeConfig) -> Vec<String> {
        let mut names: Vec<String> = config
            .tagged_fields
            .iter()
            .filter_map(|field| {
                let value = record.str_field(field);
                (!value.is_empty()).then(|| value.to_string())
            })
            .collect();
        names.sort();
        names.truncate(collector_model::table::MSG_TABLE_MAX_OBJECTS_PER_MSG);
        names
    }

    async fn write_syslog(&self, record: &collector_model::record::SyslogRecord) -> Result<(), Error> {
        let config = self.message_types.get(&record.tag);
        if !config.process_and_store {
            return Ok(());
        }

        let object_names = self.object_names(record, &config);
        let mut rows = vec![tables::build_message_row(record, &object_names, &self.ttl_hours)];
        rows.extend(tables::build_object_value_rows(record, &object_names, &self.ttl_hours));
        {
            let mut cache = self.field_names_cache.lock().expect("field-names cache lock poisoned");
            rows.extend(tables::build_field_names_rows(record, &mut cache, &self.ttl_hours));
        }

        if !config.tagged_fields.is_empty() {
            rows.push(tables::build_stats_row(record, &record.tag, &config.name, &self.ttl_hours));
        }

        if record.tag.starts_with("APPTRACK_SESSION") {
            let is_si = record.str_field("is-si-flow") == "true";
            let is_client = record.str_field("is-client-session") == "true";
            rows.push(tables::build_session_row(record, is_si, is_client, &self.ttl_hours));
        }

        self.driver.queue_stats(rows).await.map_err(|err| Error::Processor {
            processor: self.name.clone(),
            error: err.to_string(),
            context: std::collections::HashMap::new(),
        })?;
        self.counters.incr("rows_written", 1);
        Ok(())
    }

    async fn write_metric(&self, metric: &collector_model::metric::MetricRecord) -> Result<(), Error> {
        let (stat_name, stat_attr) = match metric.group {
            collector_model::metric::MetricGroup::AppMetricsSla => ("SDWANMetrics", "app_metrics_sla"),
            collector_model::metric::MetricGroup::AppMetricsUser => ("SDWANMetrics", "app_metrics_user"),
            collector_model::metric::MetricGroup::AppMetricsLink => ("SDWANMetrics", "app_metrics_link"),
            collector_model::metric::MetricGroup::LinkMetricsTrafficType => ("SDWANMetrics", "link_metrics_traffic_type"),
            collector_model::metric::MetricGroup::TenantMetricsSla => ("SDWANTenantMetrics", "tenant_metrics_sla"),
        };
        let row = tables::build_stats_row_from_metric(metric, stat_name, stat_attr, current_t2(), &self.ttl_hours);
        self.driver.queue_stats(vec![row]).await.map_err(|err| Error::Processor {
            processor: self.name.clone(),
            error: err.to_string(),
            context: std::collections::HashMap::new(),
        })?;
        self.counters.incr("rows_written", 1);
        Ok(())
    }
}

#[async_trait]
impl AsyncProcessor<CollectorEvent> for StoreProcessor {
    async fn process(&mut self, signal: Signal<CollectorEvent>, effect_handler: &mut EffectHandler<CollectorEvent>) -> Result<(), Error> {
        match signal {
            Signal::Messages { messages } => {
                for message in &messages {
                    match message {
                        CollectorEvent::Syslog(record) => self.write_syslog(record).await?,
                        CollectorEvent::Metric(metric) => self.write_metric(metric).await?,
                    }
                }
                effect_handler.emit_messages(messages);
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

/// Builds [`StoreProcessor`] instances sharing one [`StoreDriver`].
pub struct StoreProcessorFactory {
    driver: Arc<dyn StoreDriver>,
    message_types: MessageTypeTable,
    counters: Arc<IntrospectCounters>,
    ttl_hours: HashMap<TtlClass, u32>,
}

impl StoreProcessorFactory {
    /// Creates a factory handing `driver`/`message_types`/`counters`/
    /// `ttl_hours` to every processor it builds.
    pub fn new(driver: Arc<dyn StoreDriver>, message_types: MessageTypeTable, counters: Arc<IntrospectCounters>, ttl_hours: HashMap<TtlClass, u32>) -> Self {
        Self {
            driver,
            message_types,
            counters,
            ttl_hours,
        }
    }
}

impl processor::ProcessorFactory<CollectorEvent> for StoreProcessorFactory {
    fn create(
        &self,
        processor_name: &str,
        processor_type: &str,
        _config: YamlValue,
    ) -> Result<Box<dyn AsyncProcessor<CollectorEvent> + Send + Sync>, Error> {
        match processor_type {
            "store" => Ok(Box::new(StoreProcessor::new(
                processor_name.to_string(),
                self.driver.clone(),
                self.message_types.clone(),
                self.counters.clone(),
                self.ttl_hours.clone(),
            ))),
            _ => Err(Error::UnknownProcessor {
                processor: processor_name.into(),
                r#type: processor_type.into(),
            }),
        }
    }
}
