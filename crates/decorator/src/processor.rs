//! The `AsyncProcessor` that applies [`crate::decorate::decorate`] to every
//! syslog record flowing through the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use collector_model::CollectorEvent;
use processor::{AsyncProcessor, EffectHandler, Error};
use serde_yaml::Value as YamlValue;
use signal::Signal;

use crate::store::EnrichmentStore;

/// Decorates every [`CollectorEvent::Syslog`] it receives in place using the
/// current [`crate::store::EnrichmentSnapshot`], then forwards every event
/// (syslog and metric alike) unchanged in shape to the next pipeline stage.
pub struct DecoratorProcessor {
    name: String,
    store: Arc<EnrichmentStore>,
}

impl DecoratorProcessor {
    /// Creates a decorator reading from the shared `store`.
    pub fn new(name: String, store: Arc<EnrichmentStore>) -> Self {
        Self { name, store }
    }
}

#[async_trait]
impl AsyncProcessor<CollectorEvent> for DecoratorProcessor {
    async fn process(&mut self, signal: Signal<CollectorEvent>, effect_handler: &mut EffectHandler<CollectorEvent>) -> Result<(), Error> {
        match signal {
            Signal::Messages { mut messages } => {
                let snapshot = self.store.snapshot();
                for message in &mut messages {
                    if let Some(record) = message.as_syslog_mut() {
                        crate::decorate::decorate(record, &snapshot);
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

/// Builds [`DecoratorProcessor`] instances sharing one [`EnrichmentStore`].
pub struct DecoratorProcessorFactory {
    store: Arc<EnrichmentStore>,
}

impl DecoratorProcessorFactory {
    /// Creates a factory handing `store` to every processor it builds.
    pub fn new(store: Arc<EnrichmentStore>) -> Self {
        Self { store }
    }
}

impl processor::ProcessorFactory<CollectorEvent> for DecoratorProcessorFactory {
    fn create(
        &self,
        processor_name: &str,
        processor_type: &str,
        _config: YamlValue,
    ) -> Result<Box<dyn AsyncProcessor<CollectorEvent> + Send + Sync>, Error> {
        match processor_type {
            "decorator" => Ok(Box::new(DecoratorProcessor::new(processor_name.to_string(), self.store.clone()))),
            _ => Err(Error::UnknownProcessor {
                processor: processor_name.into(),
                r#type: processor_type.into(),
            }),
        }
    }
}
