use crate::cli::args::{Cli, Commands, EvaluateOptions};
use crate::config::{Overrides, Settings};
use crate::error::{ProcessingError, Result};
use crate::processors::{EvaluationReport, ParquetExport, Pipeline, SentinelPolicy};
use crate::utils::filename::{experiment_log_path, generate_default_parquet_filename};
use crate::writers::{CsvExperimentLog, ExperimentLog, LogMode, ParquetWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let overrides = Overrides {
        year: cli.year,
        data_dir: cli.data_dir.clone(),
    };

    match cli.command {
        Commands::Refine => {
            let pipeline = pipeline(&cli, &overrides, None)?;
            println!("\n{}", pipeline.refine()?.generate_summary());
        }

        Commands::Process => {
            let pipeline = pipeline(&cli, &overrides, None)?;
            println!("\n{}", pipeline.process()?.generate_summary());
        }

        Commands::Prepare => {
            let pipeline = pipeline(&cli, &overrides, None)?;
            println!("\n{}", pipeline.prepare()?.generate_summary());
        }

        Commands::Evaluate { ref options } => {
            let pipeline = pipeline(&cli, &overrides, Some(options))?;
            let report = pipeline.evaluate()?;
            println!("\n{}", report.summary.generate_summary());
            print_evaluation(&pipeline, &report);
        }

        Commands::Run { ref options } => {
            let pipeline = pipeline(&cli, &overrides, Some(options))?;
            let report = pipeline.run_all()?;
            for summary in &report.summaries {
                println!("\n{}", summary.generate_summary());
            }
            println!(
                "R2 score for {}: {:.4} ({})",
                pipeline.year(),
                report.evaluation.score.r2_score,
                report.evaluation.consistency
            );
        }

        Commands::Info { ref file, sample } => match file {
            Some(path) => show_parquet(path, sample)?,
            None => {
                let data_dir = cli.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
                show_experiment_log(&data_dir)?;
            }
        },
    }

    Ok(())
}

/// Install the fmt subscriber; `RUST_LOG` takes precedence over `--verbose`
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

fn pipeline(cli: &Cli, overrides: &Overrides, options: Option<&EvaluateOptions>) -> Result<Pipeline> {
    let settings = Settings::load(cli.config.as_deref(), overrides)?;
    info!(
        year = settings.year(),
        data_dir = %settings.data_dir.display(),
        "Starting"
    );

    let mut pipeline = Pipeline::new(&settings.data_dir, settings.year()).with_silent(cli.quiet);

    if let Some(options) = options {
        let policy = if options.keep_measured_zero {
            SentinelPolicy::KeepMeasuredZero
        } else {
            SentinelPolicy::ZeroIsMissing
        };
        let log_mode = if options.replace_year {
            LogMode::ReplaceYear
        } else {
            LogMode::Append
        };
        let parquet = options.parquet.as_ref().map(|path| ParquetExport {
            path: if path.as_os_str().is_empty() {
                generate_default_parquet_filename(&settings.data_dir, settings.year())
            } else {
                path.clone()
            },
            compression: options.compression.clone(),
        });

        pipeline = pipeline
            .with_policy(policy)
            .with_log_mode(log_mode)
            .with_parquet_export(parquet);
    }

    Ok(pipeline)
}

fn print_evaluation(pipeline: &Pipeline, report: &EvaluationReport) {
    println!("Consolidated table: {}", report.consolidated.display());
    println!(
        "R2 score for {}: {:.4} over {} pairs",
        pipeline.year(),
        report.evaluation.score.r2_score,
        report.evaluation.samples
    );
    println!("The {} dataset is {}", pipeline.year(), report.evaluation.consistency);
}

fn show_parquet(path: &Path, sample: usize) -> Result<()> {
    let writer = ParquetWriter::new();
    let file_info = writer.get_file_info(path)?;
    println!("{}", file_info.summary());

    if sample > 0 {
        let records = writer.read_records(path, sample)?;
        println!("\nSample Records:");
        for (i, record) in records.iter().enumerate() {
            println!(
                "{}. {} {}: computed {:.3}, ground truth {:.3}",
                i + 1,
                record.file_no,
                record.parameter,
                record.computed,
                record.ground_truth
            );
        }
    }
    Ok(())
}

fn show_experiment_log(data_dir: &Path) -> Result<()> {
    let log = CsvExperimentLog::new(&experiment_log_path(data_dir));
    let records = log.records()?;
    if records.is_empty() {
        println!("No experiments recorded in {}", log.path().display());
        return Ok(());
    }

    println!("Experiment Records ({}):", log.path().display());
    for record in &records {
        let status = if record.is_consistent() { "consistent" } else { "not consistent" };
        println!("  {}  {:.4}  {}", record.year, record.r2_score, status);
    }
    Ok(())
}
