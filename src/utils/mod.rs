pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{dms_to_decimal, parse_coordinate, parse_optional_coordinate};
pub use filename::{
    consolidated_data_path, experiment_log_path, generate_default_parquet_filename,
    list_csv_files, metrics_path, stage_year_dir, station_code_from_path, station_details_path,
};
pub use progress::ProgressReporter;
