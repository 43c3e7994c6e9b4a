//! Create WARC files from Versionista captures in EDGI's Web Monitoring database.

mod cli;
mod error;
mod logwarc;

use crate::cli::{Cli, Command, ConvertArgs, LogArgs};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vwarc_compress::Compression;
use vwarc_config::Config;
use vwarc_convert::{ChainTranslator, ConvertOptions, Summary, convert};
use vwarc_source::{Credentials, DbClient, HttpFetcher, RetryPolicy, VersionQuery};
use vwarc_storage::backend::LocalBackend;
use vwarc_warc::{GIGABYTE, SeriesOptions, WarcSeries};

const DEFAULT_FILTER: &str = "warn,versionista_warc=info,vwarc_convert=info,vwarc_warc=info";
const VERBOSE_FILTER: &str = "info,versionista_warc=debug,vwarc_convert=debug,vwarc_warc=debug,vwarc_source=debug";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Some(Command::Log(args)) => run_log(args).await,
        None => run_convert(cli.convert, cli.config.as_deref()).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => DEFAULT_FILTER,
        1 => VERBOSE_FILTER,
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Layer command-line flags over the loaded configuration.
fn apply_args(config: &mut Config, args: &ConvertArgs) {
    if let Some(path) = &args.path {
        config.output.path = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if let Some(name) = path.file_name() {
            config.output.name = name.to_string_lossy().into_owned();
        }
    }
    if args.uncompressed {
        config.output.compression = Compression::None;
    }
    if let Some(size) = args.size {
        config.output.max_size = (size * GIGABYTE as f64) as u64;
    }
    if args.skip_errors {
        config.skip_errors = true;
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().or_raise(|| ErrorKind::Setup("working directory"))?;
    Ok(cwd.join(path))
}

async fn run_convert(args: ConvertArgs, config_file: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_file).or_raise(|| ErrorKind::Config)?;
    apply_args(&mut config, &args);
    config.validate().or_raise(|| ErrorKind::Config)?;

    let database = &config.database;
    let credentials = match (&database.email, &database.password) {
        (Some(email), Some(password)) => Some(Credentials { email: email.clone(), password: password.clone() }),
        _ => None,
    };
    let client = DbClient::new(
        &database.url,
        credentials,
        Duration::from_secs(database.timeout_secs),
        RetryPolicy::default(),
    )
    .or_raise(|| ErrorKind::Setup("database client"))?;
    let retry = RetryPolicy { retries: config.fetch.retries, base_delay: Duration::from_millis(config.fetch.backoff_ms) };
    let fetcher = HttpFetcher::new(Duration::from_secs(config.fetch.timeout_secs), retry)
        .or_raise(|| ErrorKind::Setup("body fetcher"))?;
    let translator = ChainTranslator::new(Arc::new(fetcher), database.public_url.as_str());

    let root = absolute(&config.output.path)?;
    let backend = LocalBackend::new("output", &root).or_raise(|| ErrorKind::Setup("output directory"))?;
    let options = SeriesOptions {
        name: config.output.name.clone(),
        compression: config.output.compression,
        max_size: config.output.max_size,
        revisit_cache_size: config.output.revisit_cache_size,
        info: config.output.info.iter().collect(),
    };
    let mut series = WarcSeries::new(Arc::new(backend), options);
    info!(output = %root.join(&config.output.name).display(), db = %client.url(), "Converting versions");

    let query = VersionQuery {
        source_type: Some(database.source_type.clone()),
        different: Some(false),
        chunk_size: database.chunk_size,
    };
    let options = ConvertOptions { start: args.start, limit: args.limit, skip_errors: config.skip_errors };
    let mut summary = Summary::default();
    let result = convert(&client, &query, &translator, &mut series, &options, &mut summary).await;
    print_summary(&summary);
    result.or_raise(|| ErrorKind::Convert)
}

fn print_summary(summary: &Summary) {
    print!("{}", format_summary(summary));
}

fn format_summary(summary: &Summary) -> String {
    let mut output = format!("Skipped {} Versionista versions:\n", summary.total_skipped());
    for (reason, count) in &summary.skipped {
        output.push_str(&format!("  {:.<25} {count:>5}\n", reason.as_str()));
    }
    output
}

async fn run_log(args: LogArgs) -> Result<()> {
    let log = absolute(&logwarc::log_file(&args.path))?;
    let (Some(dir), Some(name)) = (log.parent(), log.file_name()) else {
        exn::bail!(ErrorKind::LogMissing(log.clone()));
    };
    if !log.is_file() {
        exn::bail!(ErrorKind::LogMissing(log.clone()));
    }
    let backend = LocalBackend::new("log", dir).or_raise(|| ErrorKind::Setup("log directory"))?;
    let compression = Compression::from(!args.uncompressed);
    let path = logwarc::create_log_warc(&backend, Path::new(name), compression).await?;
    println!("Wrote WARC file to {}", dir.join(path).display());
    Ok(())
}
