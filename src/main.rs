use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use payrail::application::orchestrator::PayoutOrchestrator;
use payrail::config::AppConfig;
use payrail::domain::ports::{EventSinkRef, RetryAuditStoreRef};
use payrail::infrastructure::in_memory::{InMemoryEventStore, InMemoryRetryAuditStore};
use payrail::infrastructure::jsonl::JsonlStore;
use payrail::infrastructure::simulated::SimulatedPaymentExecutor;
use payrail::interfaces::csv::outcome_writer::OutcomeWriter;
use payrail::interfaces::csv::request_reader::PayoutRequestReader;
use payrail::logging::init_logging;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Environment variables prefixed PAYRAIL_ override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for JSON-lines event and retry logs (optional).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process payout requests from a CSV file and print their outcomes
    Process {
        /// Input payout requests CSV file
        input: PathBuf,
    },
    /// Print the most recent pipeline events as JSON lines
    Logs {
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Print the most recent retry audit entries as JSON lines
    Retries {
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

struct Stores {
    events: EventSinkRef,
    audit: RetryAuditStoreRef,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).into_diagnostic()?;
    init_logging(&config.logging);

    let stores = open_stores(&cli).await?;

    match cli.command {
        Command::Process { input } => process(&config, stores, &input).await,
        Command::Logs { limit } => {
            let events = stores.events.list_recent(limit).await.into_diagnostic()?;
            print_json_lines(&events)
        }
        Command::Retries { limit } => {
            let retries = stores
                .audit
                .list_recent_retries(limit)
                .await
                .into_diagnostic()?;
            print_json_lines(&retries)
        }
    }
}

async fn open_stores(cli: &Cli) -> Result<Stores> {
    if let Some(db_path) = &cli.db_path
        && let Some(stores) = open_rocksdb(db_path)?
    {
        return Ok(stores);
    }

    if let Some(data_dir) = &cli.data_dir {
        let store = Arc::new(JsonlStore::open(data_dir).await.into_diagnostic()?);
        return Ok(Stores {
            events: store.clone(),
            audit: store,
        });
    }

    Ok(Stores {
        events: Arc::new(InMemoryEventStore::new()),
        audit: Arc::new(InMemoryRetryAuditStore::new()),
    })
}

#[cfg(feature = "storage-rocksdb")]
fn open_rocksdb(db_path: &Path) -> Result<Option<Stores>> {
    use payrail::infrastructure::rocksdb::RocksDBStore;

    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    Ok(Some(Stores {
        events: Arc::new(store.clone()),
        audit: Arc::new(store),
    }))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_rocksdb(db_path: &Path) -> Result<Option<Stores>> {
    tracing::warn!(
        db_path = %db_path.display(),
        "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
    );
    Ok(None)
}

async fn process(config: &AppConfig, stores: Stores, input: &Path) -> Result<()> {
    let executor = Arc::new(SimulatedPaymentExecutor::new(
        config.executor.failures_before_success,
    ));
    let orchestrator = Arc::new(PayoutOrchestrator::from_config(
        config,
        executor,
        stores.events,
        stores.audit,
    ));

    let semaphore = Arc::new(Semaphore::new(config.pipeline.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    let file = File::open(input).into_diagnostic()?;
    let reader = PayoutRequestReader::new(file);
    for (index, request) in reader.requests().enumerate() {
        match request {
            Ok(request) => {
                let permit = semaphore.clone().acquire_owned().await.into_diagnostic()?;
                let orchestrator = orchestrator.clone();
                tasks.spawn(async move {
                    let outcome = orchestrator.process(request).await;
                    drop(permit);
                    (index, outcome)
                });
            }
            Err(e) => {
                error!(row = index + 1, error = %e, "Error reading payout request");
            }
        }
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!(error = %e, "Payout task failed"),
        }
    }
    outcomes.sort_by_key(|(index, _)| *index);
    info!(processed = outcomes.len(), "Batch complete");

    let stdout = io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock());
    writer
        .write_outcomes(outcomes.iter().map(|(_, outcome)| outcome))
        .into_diagnostic()?;

    Ok(())
}

fn print_json_lines<T: serde::Serialize>(records: &[T]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in records {
        let line = serde_json::to_string(record).into_diagnostic()?;
        writeln!(out, "{line}").into_diagnostic()?;
    }
    Ok(())
}
