mod engine;
mod ingest;
mod models;
mod storage;
mod types;
mod validation;

use std::io::{stderr, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use serde::Serialize;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::engine::{DealImporter, ImporterConfig};
use crate::ingest::Upload;
use crate::models::{DealRecord, ImportSummary, StoredDeal};
use crate::storage::{CsvErrorLog, DealStorage, ErrorLog, ErrorSink};
use crate::types::CurrencyTable;

enum Command {
    Import { input: PathBuf, errors: Option<PathBuf> },
    List { input: PathBuf },
    Get { deal_id: String, input: PathBuf }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Summary(ImportSummary),
    Deals(Vec<StoredDeal>),
    Deal(StoredDeal)
}

/// Importer tunables read from the environment, falling back to the defaults.
struct Settings {
    config: ImporterConfig,
    currencies: Option<Arc<CurrencyTable>>
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let Some((command, log_level)) = parse_args(&args) else {
        eprintln!("Usage: fx-deal-importer [deals].csv|[deal].json [log_level:optional] [errors].csv:optional > [summary].json");
        eprintln!("       fx-deal-importer list [deals].csv|[deals].json [log_level:optional] > [deals].json");
        eprintln!("       fx-deal-importer get [deal_id] [deals].csv|[deals].json [log_level:optional] > [deal].json");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        eprintln!("Environment: FX_MAX_FUTURE_SKEW_DAYS, FX_MAX_DEAL_ID_LENGTH, FX_INTERNAL_ERROR_MESSAGE, FX_ACCEPTED_CONTENT_TYPES, FX_CURRENCIES");
        exit(1);
    };

    setup_logging(log_level);

    let settings = settings_from_env()?;
    let timer = Instant::now();

    // The pipeline does blocking I/O per record, keep it off the async workers.
    let output = tokio::task::spawn_blocking(move || run(command, &settings)).await??;

    let duration = timer.elapsed();
    info!("Finished in: {duration:?}");

    write_json_to_stdout(&output)?;

    Ok(())
}

fn parse_args(args: &[String]) -> Option<(Command, LevelFilter)> {
    let level = |index: usize| args.get(index).map(|s| parse_log_level(s)).unwrap_or(LevelFilter::ERROR);

    match args.get(1)?.as_str() {
        "list" => Some((Command::List { input: PathBuf::from(args.get(2)?) }, level(3))),
        "get" => Some((Command::Get { deal_id: args.get(2)?.clone(), input: PathBuf::from(args.get(3)?) }, level(4))),
        input => Some((Command::Import { input: PathBuf::from(input), errors: args.get(3).map(PathBuf::from) }, level(2)))
    }
}

fn settings_from_env() -> Result<Settings> {
    let mut config = ImporterConfig::default();

    if let Some(days) = env_value::<u32>("FX_MAX_FUTURE_SKEW_DAYS")? {
        config.max_future_skew = Duration::try_days(i64::from(days))
            .ok_or_else(|| anyhow!("FX_MAX_FUTURE_SKEW_DAYS is out of range: {days}"))?;
    }

    if let Some(length) = env_value::<usize>("FX_MAX_DEAL_ID_LENGTH")? {
        config.max_deal_id_length = length;
    }

    if let Ok(message) = std::env::var("FX_INTERNAL_ERROR_MESSAGE") {
        config.internal_error_message = message;
    }

    if let Ok(content_types) = std::env::var("FX_ACCEPTED_CONTENT_TYPES") {
        config.accepted_content_types = split_list(&content_types);
    }

    let currencies = std::env::var("FX_CURRENCIES").ok().map(|codes| {
        let table = CurrencyTable::from_codes(split_list(&codes.to_uppercase()));
        info!("Using {} configured currency codes", table.len());
        Arc::new(table)
    });

    Ok(Settings { config, currencies })
}

fn env_value<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value.trim().parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {name}: '{value}'")),
        Err(_) => Ok(None)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    fn importer<E: ErrorSink>(&self, storage: Arc<DealStorage>, errors: Arc<E>) -> DealImporter<DealStorage, E> {
        let importer = DealImporter::new(storage, errors).with_config(self.config.clone());

        match &self.currencies {
            Some(currencies) => importer.with_currency_table(currencies.clone()),
            None => importer
        }
    }
}

fn run(command: Command, settings: &Settings) -> Result<Output> {
    let storage = Arc::new(DealStorage::new());

    match command {
        Command::Import { input, errors: Some(errors_path) } => {
            let errors = CsvErrorLog::open(&errors_path)
                .with_context(|| format!("Unable to open error log at {}", errors_path.display()))?;
            let summary = import_file(&settings.importer(storage.clone(), Arc::new(errors)), &input)?;

            info!("Deal store now holds {} deals", storage.len());
            Ok(Output::Summary(summary))
        }
        Command::Import { input, errors: None } => {
            let errors = Arc::new(ErrorLog::new());
            let summary = import_file(&settings.importer(storage.clone(), errors.clone()), &input)?;

            info!("Deal store now holds {} deals, {} import errors recorded", storage.len(), errors.entries().len());
            Ok(Output::Summary(summary))
        }
        Command::List { input } => {
            let importer = settings.importer(storage, Arc::new(ErrorLog::new()));
            import_file(&importer, &input)?;

            Ok(Output::Deals(importer.list_deals()?))
        }
        Command::Get { deal_id, input } => {
            let importer = settings.importer(storage, Arc::new(ErrorLog::new()));
            import_file(&importer, &input)?;

            Ok(Output::Deal(importer.get_deal(&deal_id)?))
        }
    }
}

fn import_file<E: ErrorSink>(importer: &DealImporter<DealStorage, E>, path: &Path) -> Result<ImportSummary> {
    let upload = Upload::from_path(path)
        .with_context(|| format!("Unable to read input at {}", path.display()))?;

    if upload.content_type() == Some("application/json") {
        return import_json(importer, &upload);
    }

    Ok(importer.upload_csv(&upload)?)
}

fn import_json<E: ErrorSink>(importer: &DealImporter<DealStorage, E>, upload: &Upload) -> Result<ImportSummary> {
    let value: serde_json::Value = serde_json::from_slice(upload.bytes()).context("Input is not valid JSON")?;

    if value.is_array() {
        let deals: Vec<DealRecord> = serde_json::from_value(value).context("Input is not a list of deals")?;
        return Ok(importer.import_deals(deals));
    }

    let deal: DealRecord = serde_json::from_value(value).context("Input is not a deal")?;

    Ok(importer.import_deal(deal))
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the JSON output, so logs go to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_json_to_stdout(output: &Output) -> Result<()> {
    let mut output_writer = BufWriter::new(stdout().lock());

    serde_json::to_writer_pretty(&mut output_writer, output)?;
    writeln!(output_writer)?;

    output_writer.flush()?;

    Ok(())
}
