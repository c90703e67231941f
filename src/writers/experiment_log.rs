use crate::error::Result;
use crate::models::YearScore;
use crate::writers::csv_writer::commit_file;
use std::path::{Path, PathBuf};
use tracing::info;
use validator::Validate;

/// Durable record of yearly scores
pub trait ExperimentLog {
    fn append(&mut self, score: &YearScore) -> Result<()>;
    fn records(&self) -> Result<Vec<YearScore>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// Every run adds a row, re-scored years included
    #[default]
    Append,
    /// Rows for the scored year are replaced by the new one
    ReplaceYear,
}

/// `Experiment Records.csv` with columns Year, R2 Score
pub struct CsvExperimentLog {
    path: PathBuf,
    mode: LogMode,
}

impl CsvExperimentLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            mode: LogMode::Append,
        }
    }

    pub fn with_mode(mut self, mode: LogMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExperimentLog for CsvExperimentLog {
    fn append(&mut self, score: &YearScore) -> Result<()> {
        score.validate()?;

        let mut rows = self.records()?;
        if self.mode == LogMode::ReplaceYear {
            rows.retain(|r| r.year != score.year);
        }
        rows.push(*score);

        commit_file(&self.path, |file| {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(true)
                .from_writer(file);
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            Ok(())
        })?;

        info!(
            year = score.year,
            r2_score = score.r2_score,
            rows = rows.len(),
            log = %self.path.display(),
            "Recorded experiment"
        );
        Ok(())
    }

    fn records(&self) -> Result<Vec<YearScore>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<YearScore>() {
            rows.push(row?);
        }
        Ok(rows)
    }
}
