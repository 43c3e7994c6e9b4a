use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "versionista-warc",
    version,
    about = "Create WARC files from Versionista captures in EDGI's Web Monitoring database",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging; repeat for even more
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Package a run's log file into its own WARC
    Log(LogArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Output path and base name, e.g. `out/archive` writes `out/archive--<date>.warc.gz`
    pub path: Option<PathBuf>,

    /// Write `.warc` files instead of gzipped `.warc.gz` files
    #[arg(long)]
    pub uncompressed: bool,

    /// Only convert this many versions
    #[arg(long)]
    pub limit: Option<usize>,

    /// Skip this many versions before converting
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Start a new file once one grows past this many gigabytes
    #[arg(long, value_name = "GB")]
    pub size: Option<f64>,

    /// Count unexpected errors and keep going instead of stopping
    #[arg(long)]
    pub skip_errors: bool,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Log file, or a directory containing `log.txt`
    pub path: PathBuf,

    /// Write a `.warc` file instead of a gzipped `.warc.gz` file
    #[arg(long)]
    pub uncompressed: bool,
}
