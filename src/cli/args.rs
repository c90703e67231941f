use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lcd-processor")]
#[command(about = "Consistency checker for NOAA Local Climatological Data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Year to process [default: params.year]")]
    pub year: Option<i32>,

    #[arg(short, long, global = true, help = "Data directory holding Archive/, Refined/, ...")]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Settings file [default: ./params.yaml]")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress bars")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct EvaluateOptions {
    #[arg(
        long,
        help = "Also write the consolidated table as Parquet [default path: Consolidated/<YEAR>/lcd-consolidated-<YEAR>-{YYMMDD}.parquet]",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub parquet: Option<PathBuf>,

    #[arg(long, default_value = "snappy")]
    pub compression: String,

    #[arg(long, help = "Keep monthly averages of exactly 0.0 instead of treating them as missing")]
    pub keep_measured_zero: bool,

    #[arg(long, help = "Replace earlier log rows for the same year instead of appending")]
    pub replace_year: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Narrow raw station files and register stations
    Refine,

    /// Compute monthly averages of the hourly parameters
    Process,

    /// Join monthly ground-truth values onto the computed averages
    Prepare,

    /// Consolidate, score and log the year's R2
    Evaluate {
        #[command(flatten)]
        options: EvaluateOptions,
    },

    /// Run refine, process, prepare and evaluate in order
    Run {
        #[command(flatten)]
        options: EvaluateOptions,
    },

    /// Display a Parquet export or the experiment log
    Info {
        #[arg(short, long, help = "Parquet file to inspect [default: show the experiment log]")]
        file: Option<PathBuf>,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Refine => "refine",
            Commands::Process => "process",
            Commands::Prepare => "prepare",
            Commands::Evaluate { .. } => "evaluate",
            Commands::Run { .. } => "run",
            Commands::Info { .. } => "info",
        }
    }
}
