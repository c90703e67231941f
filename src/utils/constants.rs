/// Stage directory names (each holds one sub-directory per year)
pub const ARCHIVE_DIR: &str = "Archive";
pub const REFINED_DIR: &str = "Refined";
pub const PROCESSED_DIR: &str = "Processed";
pub const PREPARED_DIR: &str = "Prepared";
pub const CONSOLIDATED_DIR: &str = "Consolidated";
pub const EVAL_DIR: &str = "eval";

/// File names
pub const EXPERIMENT_LOG_FILE: &str = "Experiment Records.csv";
pub const METRICS_FILE: &str = "metrics.json";
pub const PARAMS_FILE: &str = "params.yaml";
pub const CSV_EXTENSION: &str = "csv";

/// Station details table columns
pub const STATION_NUMBER_COLUMN: &str = "Station Number";
pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";
pub const STATION_NAME_COLUMN: &str = "Station Name";

/// Consolidated table columns
pub const FILE_NO_COLUMN: &str = "File No.";
pub const PARAMETER_COLUMN: &str = "Parameter";
pub const COMPUTED_COLUMN: &str = "Computed";
pub const GROUND_TRUTH_COLUMN: &str = "Ground Truth";

/// Column name prefixes in processed/prepared tables
pub const COMPUTED_PREFIX: &str = "Computed";
pub const GROUND_TRUTH_PREFIX: &str = "GT";
pub const MONTH_COLUMN: &str = "MONTH";

/// A station file is kept only if strictly more than this many of its
/// 10 parameter columns hold at least one value. Inherited from the
/// original LCD processing runs; no documented derivation.
pub const MIN_POPULATED_COLUMNS: usize = 5;

/// A year's dataset is consistent when the pooled R2 reaches this value
pub const CONSISTENCY_THRESHOLD: f64 = 0.9;

pub const MONTHS_PER_YEAR: usize = 12;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
