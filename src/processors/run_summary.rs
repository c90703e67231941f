use crate::models::Parameter;
use crate::processors::monthly_aggregator::AggregationStats;
use crate::processors::utility_filter::Utility;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Refine,
    Process,
    Prepare,
    Evaluate,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Refine, Stage::Process, Stage::Prepare, Stage::Evaluate];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Refine => "Refine",
            Stage::Process => "Process",
            Stage::Prepare => "Prepare",
            Stage::Evaluate => "Evaluate",
        };
        write!(f, "{}", name)
    }
}

/// Why a file produced no output in a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    MissingGeolocation,
    InsufficientColumns,
    /// Upstream stage output for the same station is absent
    MissingCounterpart,
}

impl SkipReason {
    pub fn from_utility(utility: Utility) -> Option<Self> {
        match utility {
            Utility::Useful => None,
            Utility::MissingGeolocation => Some(SkipReason::MissingGeolocation),
            Utility::InsufficientColumns { .. } => Some(SkipReason::InsufficientColumns),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingGeolocation => write!(f, "missing geolocation"),
            SkipReason::InsufficientColumns => write!(f, "too few populated columns"),
            SkipReason::MissingCounterpart => write!(f, "no upstream counterpart"),
        }
    }
}

/// Recoverable conditions counted over one stage run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub stage: Stage,
    pub year: i32,
    pub files_seen: usize,
    pub files_written: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub empty_columns: BTreeMap<String, Vec<Parameter>>,
    pub empty_months: usize,
    pub rejected_values: usize,
    pub new_stations: usize,
    pub consolidated_rows: usize,
}

impl RunSummary {
    pub fn new(stage: Stage, year: i32) -> Self {
        Self {
            stage,
            year,
            files_seen: 0,
            files_written: 0,
            skipped: BTreeMap::new(),
            empty_columns: BTreeMap::new(),
            empty_months: 0,
            rejected_values: 0,
            new_stations: 0,
            consolidated_rows: 0,
        }
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn files_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn record_aggregation(&mut self, station: &str, stats: &AggregationStats) {
        if !stats.empty_columns.is_empty() {
            self.empty_columns
                .entry(station.to_string())
                .or_default()
                .extend(stats.empty_columns.iter().copied());
        }
        self.empty_months += stats.empty_months.len();
        self.rejected_values += stats.rejected_values;
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== {} Report ({}) ===\n", self.stage, self.year));
        summary.push_str(&format!("Files Seen: {}\n", self.files_seen));
        summary.push_str(&format!("Files Written: {}\n", self.files_written));

        match self.stage {
            Stage::Refine => {
                summary.push_str(&format!(
                    "{} useful files out of {}\n",
                    self.files_written, self.files_seen
                ));
                summary.push_str(&format!("New Stations: {}\n", self.new_stations));
            }
            Stage::Evaluate => {
                summary.push_str(&format!("Consolidated Rows: {}\n", self.consolidated_rows));
            }
            Stage::Process | Stage::Prepare => {}
        }

        summary.push_str(&format!("Files Skipped: {}\n", self.files_skipped()));
        for (reason, count) in &self.skipped {
            summary.push_str(&format!("  - {}: {}\n", reason, count));
        }

        if self.empty_months > 0 || self.rejected_values > 0 {
            summary.push_str(&format!(
                "Months With No Counted Samples: {}\n",
                self.empty_months
            ));
            summary.push_str(&format!("Unparseable Values: {}\n", self.rejected_values));
        }

        if !self.empty_columns.is_empty() {
            summary.push_str(&format!(
                "\nEmpty Columns ({} stations):\n",
                self.empty_columns.len()
            ));
            for (station, parameters) in self.empty_columns.iter().take(10) {
                let names: Vec<&str> = parameters.iter().map(|p| p.display_name()).collect();
                summary.push_str(&format!("  {}: {}\n", station, names.join(", ")));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_counts_by_reason() {
        let mut summary = RunSummary::new(Stage::Process, 2020);
        summary.files_seen = 4;
        summary.files_written = 1;
        summary.record_skip(SkipReason::MissingGeolocation);
        summary.record_skip(SkipReason::InsufficientColumns);
        summary.record_skip(SkipReason::InsufficientColumns);

        assert_eq!(summary.files_skipped(), 3);
        let text = summary.generate_summary();
        assert!(text.contains("=== Process Report (2020) ==="));
        assert!(text.contains("too few populated columns: 2"));
        assert!(text.contains("missing geolocation: 1"));
    }

    #[test]
    fn test_refine_reports_useful_files() {
        let mut summary = RunSummary::new(Stage::Refine, 2021);
        summary.files_seen = 7;
        summary.files_written = 3;

        assert!(summary.generate_summary().contains("3 useful files out of 7"));
    }

    #[test]
    fn test_aggregation_stats_accumulate() {
        let mut summary = RunSummary::new(Stage::Process, 2020);
        let stats = AggregationStats {
            empty_columns: vec![Parameter::WetBulbTemperature],
            empty_months: vec![(Parameter::RelativeHumidity, 2), (Parameter::RelativeHumidity, 3)],
            rejected_values: 4,
        };
        summary.record_aggregation("72503", &stats);
        summary.record_aggregation("72504", &AggregationStats::default());

        assert_eq!(summary.empty_months, 2);
        assert_eq!(summary.rejected_values, 4);
        assert_eq!(summary.empty_columns.len(), 1);
        assert!(summary
            .generate_summary()
            .contains("72503: Wet Bulb Temperature"));
    }

    #[test]
    fn test_skip_reason_from_utility() {
        assert_eq!(SkipReason::from_utility(Utility::Useful), None);
        assert_eq!(
            SkipReason::from_utility(Utility::InsufficientColumns { populated: 2 }),
            Some(SkipReason::InsufficientColumns)
        );
    }
}
