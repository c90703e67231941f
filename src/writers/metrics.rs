use crate::error::Result;
use crate::models::YearScore;
use crate::writers::csv_writer::commit_file;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// `eval/metrics.json`: latest R2 per year, keyed by year string
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    #[serde(default)]
    pub r2_score: BTreeMap<String, f64>,
}

impl MetricsSummary {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn record(&mut self, score: &YearScore) {
        self.r2_score.insert(score.year.to_string(), score.r2_score);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        commit_file(path, |file| {
            serde_json::to_writer_pretty(file, self)?;
            Ok(())
        })
    }

    /// Load, add `score`, write back
    pub fn merge_into(path: &Path, score: &YearScore) -> Result<Self> {
        let mut summary = Self::load(path)?;
        summary.record(score);
        summary.save(path)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_merge_keeps_other_years() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("eval").join("metrics.json");

        MetricsSummary::merge_into(&path, &YearScore::new(2019, 0.8))?;
        MetricsSummary::merge_into(&path, &YearScore::new(2020, 0.9))?;
        let summary = MetricsSummary::merge_into(&path, &YearScore::new(2019, 0.85))?;

        assert_eq!(summary.r2_score.len(), 2);
        assert_eq!(summary.r2_score["2019"], 0.85);
        assert_eq!(MetricsSummary::load(&path)?, summary);
        Ok(())
    }

    #[test]
    fn test_score_reads_back_bit_identical() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("metrics.json");
        let score = 0.9955817378497792;

        MetricsSummary::merge_into(&path, &YearScore::new(2020, score))?;
        MetricsSummary::merge_into(&path, &YearScore::new(2021, 0.5))?;

        let loaded = MetricsSummary::load(&path)?;
        assert_eq!(loaded.r2_score["2020"].to_bits(), score.to_bits());
        Ok(())
    }
}
