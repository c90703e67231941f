use crate::error::{ProcessingError, Result};
use crate::models::{ConsolidatedObservation, EnrichedTable, NarrowedTable, ParameterSchema, LCD_SCHEMA_V1};
use crate::processors::consolidation_scorer::{ConsolidationScorer, Evaluation, SentinelPolicy};
use crate::processors::ground_truth_joiner::GroundTruthJoiner;
use crate::processors::monthly_aggregator::MonthlyAggregator;
use crate::processors::run_summary::{RunSummary, SkipReason, Stage};
use crate::processors::station_registry::StationRegistry;
use crate::processors::utility_filter::UtilityFilter;
use crate::readers::{FieldExtractor, TableReader};
use crate::utils::constants::{ARCHIVE_DIR, PREPARED_DIR, PROCESSED_DIR, REFINED_DIR};
use crate::utils::coordinates::parse_optional_coordinate;
use crate::utils::filename::{
    consolidated_data_path, experiment_log_path, list_csv_files, metrics_path, stage_year_dir,
    station_code_from_path, station_details_path,
};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvExperimentLog, ExperimentLog, LogMode, MetricsSummary, ParquetWriter, TableWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Columnar copy of the consolidated table written by the evaluate stage
#[derive(Debug, Clone)]
pub struct ParquetExport {
    pub path: PathBuf,
    pub compression: String,
}

/// Evaluate-stage outcome
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub summary: RunSummary,
    pub evaluation: Evaluation,
    pub consolidated: PathBuf,
}

/// Outcome of running every stage for one year
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub summaries: Vec<RunSummary>,
    pub evaluation: Evaluation,
}

/// Drives the four stages for one year over a data directory.
///
/// Stages communicate only through files, so each one can run on its own.
pub struct Pipeline {
    data_dir: PathBuf,
    year: i32,
    schema: ParameterSchema,
    policy: SentinelPolicy,
    log_mode: LogMode,
    parquet: Option<ParquetExport>,
    silent: bool,
}

impl Pipeline {
    pub fn new(data_dir: &Path, year: i32) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            year,
            schema: LCD_SCHEMA_V1,
            policy: SentinelPolicy::default(),
            log_mode: LogMode::default(),
            parquet: None,
            silent: false,
        }
    }

    pub fn with_policy(mut self, policy: SentinelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_log_mode(mut self, log_mode: LogMode) -> Self {
        self.log_mode = log_mode;
        self
    }

    pub fn with_parquet_export(mut self, export: Option<ParquetExport>) -> Self {
        self.parquet = export;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    fn stage_dir(&self, stage: &str) -> PathBuf {
        stage_year_dir(&self.data_dir, stage, self.year)
    }

    fn input_files(&self, stage: &str) -> Result<Vec<PathBuf>> {
        let dir = self.stage_dir(stage);
        if !dir.is_dir() {
            return Err(ProcessingError::MissingData(format!(
                "Input directory not found: {}",
                dir.display()
            )));
        }
        list_csv_files(&dir)
    }

    fn output_dir(&self, stage: &str) -> Result<PathBuf> {
        let dir = self.stage_dir(stage);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn progress(&self, total: usize, message: &str) -> ProgressReporter {
        ProgressReporter::new(total as u64, message, self.silent)
    }

    /// Narrow every raw file, keep the useful ones and register their stations
    pub fn refine(&self) -> Result<RunSummary> {
        let files = self.input_files(ARCHIVE_DIR)?;
        let output_dir = self.output_dir(REFINED_DIR)?;
        let registry_path = station_details_path(&self.data_dir, self.year);
        let mut registry = StationRegistry::load(&registry_path)?;

        let extractor = FieldExtractor::with_schema(self.schema);
        let filter = UtilityFilter::new();
        let writer = TableWriter::with_schema(self.schema);
        let mut summary = RunSummary::new(Stage::Refine, self.year);

        info!(
            year = self.year,
            files = files.len(),
            schema = self.schema.version,
            "Refining raw station files"
        );
        let progress = self.progress(files.len(), "Refining station files...");

        for path in &files {
            summary.files_seen += 1;
            let table = extractor.extract(path)?;
            let utility = filter.has_enough_columns(&table);

            if let Some(reason) = SkipReason::from_utility(utility) {
                debug!(file = %path.display(), reason = %utility, "Skipping station file");
                summary.record_skip(reason);
                progress.increment(1);
                continue;
            }

            writer.write_refined(&table, &output_dir.join(file_name(path)?))?;
            summary.files_written += 1;

            if register_first_row(&mut registry, &table) {
                summary.new_stations += 1;
            }
            progress.increment(1);
        }

        registry.save(&registry_path)?;
        progress.finish_with_message(&format!(
            "{} useful files out of {}",
            summary.files_written, summary.files_seen
        ));
        info!(
            year = self.year,
            useful = summary.files_written,
            total = summary.files_seen,
            stations = registry.len(),
            "Refine complete"
        );
        Ok(summary)
    }

    /// Monthly means of the hourly columns for each useful refined file
    pub fn process(&self) -> Result<RunSummary> {
        let files = self.input_files(REFINED_DIR)?;
        let output_dir = self.output_dir(PROCESSED_DIR)?;
        let useless = StationRegistry::load(&station_details_path(&self.data_dir, self.year))?
            .useless_stations();

        let reader = TableReader::with_schema(self.schema);
        let writer = TableWriter::with_schema(self.schema);
        let filter = UtilityFilter::new();
        let aggregator = MonthlyAggregator::new();
        let hourly_columns = self.schema.hourly_columns();
        let mut summary = RunSummary::new(Stage::Process, self.year);

        info!(
            year = self.year,
            files = files.len(),
            useless_stations = useless.len(),
            "Computing monthly averages"
        );
        let progress = self.progress(files.len(), "Computing monthly averages...");

        for path in &files {
            summary.files_seen += 1;
            let table = reader.read_refined(path)?;
            let utility = filter.assess(&table, &useless);

            if let Some(reason) = SkipReason::from_utility(utility) {
                info!(station = %table.station_code, reason = %utility, "Skipping station");
                summary.record_skip(reason);
                progress.increment(1);
                continue;
            }

            let (monthly, stats) = aggregator.aggregate_with_stats(&table, &hourly_columns);
            summary.record_aggregation(&table.station_code, &stats);
            writer.write_processed(&monthly, &output_dir.join(file_name(path)?))?;
            summary.files_written += 1;
            progress.increment(1);
        }

        progress.finish_with_message(&format!("Processed {} stations", summary.files_written));
        info!(year = self.year, written = summary.files_written, "Process complete");
        Ok(summary)
    }

    /// Join monthly ground truth onto each processed file
    pub fn prepare(&self) -> Result<RunSummary> {
        let files = self.input_files(PROCESSED_DIR)?;
        let refined_dir = self.stage_dir(REFINED_DIR);
        let output_dir = self.output_dir(PREPARED_DIR)?;
        let useless = StationRegistry::load(&station_details_path(&self.data_dir, self.year))?
            .useless_stations();

        let reader = TableReader::with_schema(self.schema);
        let writer = TableWriter::with_schema(self.schema);
        let filter = UtilityFilter::new();
        let joiner = GroundTruthJoiner::new();
        let monthly_columns = self.schema.monthly_columns();
        let mut summary = RunSummary::new(Stage::Prepare, self.year);

        info!(year = self.year, files = files.len(), "Joining ground truth");
        let progress = self.progress(files.len(), "Joining ground truth...");

        for path in &files {
            summary.files_seen += 1;
            let name = file_name(path)?;
            let refined_path = refined_dir.join(&name);
            if !refined_path.is_file() {
                warn!(file = %path.display(), "No refined file for processed station");
                summary.record_skip(SkipReason::MissingCounterpart);
                progress.increment(1);
                continue;
            }

            let table = reader.read_refined(&refined_path)?;
            let utility = filter.assess(&table, &useless);
            if let Some(reason) = SkipReason::from_utility(utility) {
                info!(station = %table.station_code, reason = %utility, "Skipping station");
                summary.record_skip(reason);
                progress.increment(1);
                continue;
            }

            let computed = reader.read_processed(path)?;
            let (enriched, stats) = joiner.join_with_stats(&table, &monthly_columns, &computed);
            summary.record_aggregation(&table.station_code, &stats);
            writer.write_prepared(&enriched, &output_dir.join(&name))?;
            summary.files_written += 1;
            progress.increment(1);
        }

        progress.finish_with_message(&format!("Prepared {} stations", summary.files_written));
        info!(year = self.year, written = summary.files_written, "Prepare complete");
        Ok(summary)
    }

    /// Consolidate, score and record the year in the CSV experiment log
    pub fn evaluate(&self) -> Result<EvaluationReport> {
        let mut log = CsvExperimentLog::new(&experiment_log_path(&self.data_dir))
            .with_mode(self.log_mode);
        self.evaluate_with_log(&mut log)
    }

    pub fn evaluate_with_log(&self, log: &mut dyn ExperimentLog) -> Result<EvaluationReport> {
        let files = self.input_files(PREPARED_DIR)?;
        let reader = TableReader::with_schema(self.schema);
        let scorer = ConsolidationScorer::with_policy(self.policy);
        let mut summary = RunSummary::new(Stage::Evaluate, self.year);

        info!(
            year = self.year,
            files = files.len(),
            policy = ?self.policy,
            "Consolidating prepared files"
        );
        let progress = self.progress(files.len(), "Consolidating prepared files...");

        let mut stations: Vec<(String, EnrichedTable)> = Vec::with_capacity(files.len());
        for path in &files {
            summary.files_seen += 1;
            let code = station_code_from_path(path)?;
            stations.push((code, reader.read_prepared(path)?));
            progress.increment(1);
        }

        let rows = scorer.consolidate(&stations);
        summary.files_written = stations.len();
        summary.consolidated_rows = rows.len();

        let evaluation = scorer.evaluate(self.year, &rows)?;

        let consolidated = consolidated_data_path(&self.data_dir, self.year);
        TableWriter::with_schema(self.schema).write_consolidated(&rows, &consolidated)?;
        info!(rows = rows.len(), path = %consolidated.display(), "Wrote consolidated table");

        progress.finish_with_message(&format!(
            "R2 score for {}: {:.4}",
            self.year, evaluation.score.r2_score
        ));
        info!(
            year = self.year,
            r2_score = evaluation.score.r2_score,
            samples = evaluation.samples,
            consistency = %evaluation.consistency,
            "Scored dataset"
        );

        log.append(&evaluation.score)?;
        MetricsSummary::merge_into(&metrics_path(&self.data_dir), &evaluation.score)?;

        if let Some(export) = &self.parquet {
            self.export_parquet(&rows, export)?;
        }

        Ok(EvaluationReport {
            summary,
            evaluation,
            consolidated,
        })
    }

    fn export_parquet(&self, rows: &[ConsolidatedObservation], export: &ParquetExport) -> Result<()> {
        let writer = ParquetWriter::new().with_compression(&export.compression)?;
        writer.write_records(rows, &export.path)?;
        info!(
            path = %export.path.display(),
            rows = rows.len(),
            compression = %export.compression,
            "Exported consolidated table to Parquet"
        );
        Ok(())
    }

    /// All four stages in order
    pub fn run_all(&self) -> Result<PipelineReport> {
        let mut summaries = vec![self.refine()?, self.process()?, self.prepare()?];
        let report = self.evaluate()?;
        summaries.push(report.summary);

        Ok(PipelineReport {
            summaries,
            evaluation: report.evaluation,
        })
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid file name: {}", path.display())))
}

/// Out-of-range coordinates are logged and stored as absent
fn coordinate(raw: &str, limit: f64, station: &str) -> Option<f64> {
    match parse_optional_coordinate(raw, limit) {
        Ok(value) => value,
        Err(e) => {
            warn!(station, value = raw, error = %e, "Ignoring station coordinate");
            None
        }
    }
}

/// Returns `true` when the station was not yet in the registry
fn register_first_row(registry: &mut StationRegistry, table: &NarrowedTable) -> bool {
    let Some(first) = table.first() else {
        return false;
    };
    let latitude = coordinate(&first.latitude, 90.0, &first.station_no);
    let longitude = coordinate(&first.longitude, 180.0, &first.station_no);
    !registry.lookup_or_register(&first.station_no, latitude, longitude, &first.name)
}
