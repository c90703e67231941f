use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    CONSOLIDATED_DIR, CSV_EXTENSION, EVAL_DIR, EXPERIMENT_LOG_FILE, METRICS_FILE,
};
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// `<data_dir>/<stage>/<year>`
pub fn stage_year_dir(data_dir: &Path, stage: &str, year: i32) -> PathBuf {
    data_dir.join(stage).join(year.to_string())
}

/// `<data_dir>/Station Details for <year>.csv`
pub fn station_details_path(data_dir: &Path, year: i32) -> PathBuf {
    data_dir.join(format!("Station Details for {}.csv", year))
}

/// `<data_dir>/Consolidated/<year>/Consolidated Data of <year>.csv`
pub fn consolidated_data_path(data_dir: &Path, year: i32) -> PathBuf {
    stage_year_dir(data_dir, CONSOLIDATED_DIR, year)
        .join(format!("Consolidated Data of {}.csv", year))
}

pub fn experiment_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(EXPERIMENT_LOG_FILE)
}

pub fn metrics_path(data_dir: &Path) -> PathBuf {
    data_dir.join(EVAL_DIR).join(METRICS_FILE)
}

/// Generate default Parquet filename: Consolidated/<year>/lcd-consolidated-<year>-{YYMMDD}.parquet
pub fn generate_default_parquet_filename(data_dir: &Path, year: i32) -> PathBuf {
    let now = Local::now();
    let filename = format!(
        "lcd-consolidated-{}-{:02}{:02}{:02}.parquet",
        year,
        now.year() % 100,
        now.month(),
        now.day()
    );
    stage_year_dir(data_dir, CONSOLIDATED_DIR, year).join(filename)
}

/// Station file stem, e.g. `Prepared/2020/01234567890.csv` -> `01234567890`
pub fn station_code_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "Cannot derive station code from path: {}",
                path.display()
            ))
        })
}

/// All `*.csv` files directly inside `dir`, sorted by name for a stable run order
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(CSV_EXTENSION))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
