pub mod csv_writer;
pub mod experiment_log;
pub mod metrics;
pub mod parquet_writer;

pub use csv_writer::{commit_file, TableWriter};
pub use experiment_log::{CsvExperimentLog, ExperimentLog, LogMode};
pub use metrics::MetricsSummary;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
