use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use collector_admission::{AdmissionProcessorFactory, WatermarkEngine};
use collector_decorator::{DecoratorProcessorFactory, EnrichmentStore};
use collector_forwarder::ForwarderExporterFactory;
use collector_init::Initializer;
use collector_model::IntrospectCounters;
use collector_parser::ParserReceiverFactory;
use collector_settings::{default_message_types, load_startup_config};
use collector_store::StoreProcessorFactory;
use collector_uve::UveProcessorFactory;
use color_eyre::eyre::Result;
use engine::{multi_threaded, Engine};
use mimalloc_rust::GlobalMiMalloc;
use task::labels::ProcessLabels;
use tracing_subscriber::{fmt, EnvFilter};

mod collaborators;
mod processors;

use crate::collaborators::{AlwaysGrantedLock, InMemoryStoreDriver, LoggingMessageBusSink};
use crate::processors::CollectorProcessorFactory;

// Recommended global allocator to get the best performance out of the
// pipeline engine.
#[global_allocator]
static GLOBAL_MIMALLOC: GlobalMiMalloc = GlobalMiMalloc;

/// Structured-telemetry collector and writer.
#[derive(Parser, Debug)]
#[command(name = "telemetry-collector", version, about)]
struct Cli {
    /// Path to the startup configuration file (store endpoints, TTLs,
    /// watermarks, write switches).
    #[arg(long, default_value = "configs/startup.yaml")]
    startup_config: String,

    /// Path to the pipeline configuration file (receivers, processors,
    /// exporters).
    #[arg(long, default_value = "configs/pipeline.yaml")]
    pipeline_config: String,

    /// Identifies this process instance in task labels.
    #[arg(long, default_value = "telemetry-collector")]
    process_id: String,

    /// How often the initializer retries a failed state transition.
    #[arg(long, default_value_t = 5)]
    init_retry_secs: u64,
}

fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let startup_config = load_startup_config(&cli.startup_config)?;

    let driver: Arc<InMemoryStoreDriver> = Arc::new(InMemoryStoreDriver::new());
    let lock = Arc::new(AlwaysGrantedLock::new());
    let bus = Arc::new(LoggingMessageBusSink::new());

    let initializer = Initializer::new(
        driver.clone(),
        Some(lock),
        startup_config.clone(),
        Duration::from_secs(cli.init_retry_secs),
    );
    let init_runtime = tokio::runtime::Runtime::new()?;
    init_runtime.block_on(initializer.run());
    drop(init_runtime);
    tracing::info!("initializer reached READY, starting pipeline engine");

    let message_types = default_message_types();

    let enrichment_store = Arc::new(EnrichmentStore::new());
    let watermarks = Arc::new(WatermarkEngine::new(startup_config.watermarks));
    let counters = Arc::new(IntrospectCounters::default());

    let processor_factory = CollectorProcessorFactory::new(
        DecoratorProcessorFactory::new(enrichment_store),
        AdmissionProcessorFactory::new(watermarks, startup_config.write_switches),
        UveProcessorFactory::new(message_types.clone(), 1 << 16, true),
        StoreProcessorFactory::new(driver, message_types.clone(), counters, startup_config.ttl_hours.clone()),
    );

    let mut engine = multi_threaded::Engine::new(
        ParserReceiverFactory::new(message_types.clone()),
        processor_factory,
        ForwarderExporterFactory::new(Some(bus), message_types),
    );
    engine.run(ProcessLabels::new(&cli.process_id), cli.pipeline_config)?;

    Ok(())
}

fn init_logging() -> Result<()> {
    color_eyre::install()?;

    let subscriber = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    Ok(())
}
