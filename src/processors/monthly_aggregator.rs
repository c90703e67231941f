use crate::models::{empty_monthly_table, MonthlyTable, NarrowedTable, Parameter, PARAMETER_COUNT};
use crate::utils::constants::MONTHS_PER_YEAR;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"-?\d+\.?\d*").expect("numeric pattern is valid");
}

/// Tolerant numeric parse for LCD cells such as "32s", "-41.43a" or "0.00T".
///
/// A cell that is a plain finite number parses directly; otherwise the first
/// signed decimal run in the text is used. `None` means the cell holds no
/// number at all and must not be counted.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Some(value);
        }
    }

    NUMBER
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Samples of one column grouped by month
#[derive(Debug, Clone, Default)]
struct MonthBuckets {
    samples: [Vec<f64>; MONTHS_PER_YEAR],
}

impl MonthBuckets {
    fn add(&mut self, month: u32, value: f64) -> bool {
        match (month as usize).checked_sub(1).and_then(|i| self.samples.get_mut(i)) {
            Some(bucket) => {
                bucket.push(value);
                true
            }
            None => false,
        }
    }

    /// Mean per month; `None` where nothing was counted.
    /// Each month is summed in sorted order so row order cannot change the result.
    fn averages(&self) -> [Option<f64>; MONTHS_PER_YEAR] {
        std::array::from_fn(|i| {
            let bucket = &self.samples[i];
            if bucket.is_empty() {
                return None;
            }
            let mut sorted = bucket.clone();
            sorted.sort_by(f64::total_cmp);
            Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
        })
    }
}

/// Monthly means of one narrowed column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAverages {
    pub averages: [Option<f64>; MONTHS_PER_YEAR],
    /// Every cell in the column was blank
    pub all_null: bool,
    /// Non-blank cells without any numeric content
    pub rejected: usize,
}

impl ColumnAverages {
    /// Months (1-12) with no counted samples in a column that had data
    pub fn empty_months(&self) -> Vec<u32> {
        if self.all_null {
            return Vec::new();
        }
        self.averages
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }
}

/// Recoverable conditions seen while aggregating one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationStats {
    pub empty_columns: Vec<Parameter>,
    pub empty_months: Vec<(Parameter, u32)>,
    pub rejected_values: usize,
}

/// Month-bucketed means over selected narrowed columns
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn average_column(&self, table: &NarrowedTable, column: usize) -> ColumnAverages {
        let mut buckets = MonthBuckets::default();
        let mut all_null = true;
        let mut rejected = 0;

        for (month, cell) in table.column(column) {
            let Some(raw) = cell else { continue };
            all_null = false;
            match parse_numeric(raw) {
                Some(value) if buckets.add(month, value) => {}
                _ => rejected += 1,
            }
        }

        ColumnAverages {
            averages: buckets.averages(),
            all_null,
            rejected,
        }
    }

    /// Twelve monthly rows; `columns[p.index()]` is the narrowed column for parameter `p`
    pub fn aggregate(
        &self,
        table: &NarrowedTable,
        columns: &[usize; PARAMETER_COUNT],
    ) -> MonthlyTable {
        self.aggregate_with_stats(table, columns).0
    }

    pub fn aggregate_with_stats(
        &self,
        table: &NarrowedTable,
        columns: &[usize; PARAMETER_COUNT],
    ) -> (MonthlyTable, AggregationStats) {
        let mut monthly = empty_monthly_table();
        let mut stats = AggregationStats::default();

        for parameter in Parameter::ALL {
            let column = self.average_column(table, columns[parameter.index()]);

            if column.all_null {
                stats.empty_columns.push(parameter);
            }
            for month in column.empty_months() {
                debug!(
                    station = %table.station_code,
                    parameter = %parameter,
                    month,
                    "No counted samples"
                );
                stats.empty_months.push((parameter, month));
            }
            stats.rejected_values += column.rejected;

            for (record, average) in monthly.iter_mut().zip(column.averages) {
                record.values[parameter.index()] = average;
            }
        }

        (monthly, stats)
    }
}
