//! Routes a pipeline's `"type/instance"` processor entries to whichever
//! concrete factory (`collector-decorator`, `collector-admission`,
//! `collector-uve`, `collector-store`) understands that type.
//!
//! The engine resolves a pipeline's processor chain through exactly one
//! `ProcessorFactory`, calling `create` once per named entry in YAML order
//! (see `config::Config::load_with_factories`); this factory just tries each
//! domain factory in the pipeline's documented order and returns the first
//! match, so a single `"decorator/d1, admission/a1, uve/u1, store/s1"` chain
//! in the config resolves through the same four crates the pipeline is
//! built from.

use collector_admission::AdmissionProcessorFactory;
use collector_decorator::DecoratorProcessorFactory;
use collector_model::CollectorEvent;
use collector_store::StoreProcessorFactory;
use collector_uve::UveProcessorFactory;
use processor::{AsyncProcessor, Error, ProcessorFactory};
use serde_yaml::Value as YamlValue;

/// Composite factory chaining the decorator, admission, UVE and store
/// processor factories behind the single `ProcessorFactory` the engine
/// expects.
pub struct CollectorProcessorFactory {
    decorator: DecoratorProcessorFactory,
    admission: AdmissionProcessorFactory,
    uve: UveProcessorFactory,
    store: StoreProcessorFactory,
}

impl CollectorProcessorFactory {
    /// Creates a factory delegating to each domain factory in turn.
    pub fn new(decorator: DecoratorProcessorFactory, admission: AdmissionProcessorFactory, uve: UveProcessorFactory, store: StoreProcessorFactory) -> Self {
        Self {
            decorator,
            admission,
            uve,
            store,
        }
    }
}

impl ProcessorFactory<CollectorEvent> for CollectorProcessorFactory {
    fn create(&self, processor_name: &str, processor_type: &str, config: YamlValue) -> Result<Box<dyn AsyncProcessor<CollectorEvent> + Send + Sync>, Error> {
        match self.decorator.create(processor_name, processor_type, config.clone()) {
            Err(Error::UnknownProcessor { .. }) => {}
            result => return result,
        }
        match self.admission.create(processor_name, processor_type, config.clone()) {
            Err(Error::UnknownProcessor { .. }) => {}
            result => return result,
        }
        match self.uve.create(processor_name, processor_type, config.clone()) {
            Err(Error::UnknownProcessor { .. }) => {}
            result => return result,
        }
        self.store.create(processor_name, processor_type, config)
    }
}
