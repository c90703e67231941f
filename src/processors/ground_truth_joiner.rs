use crate::models::{EnrichedRecord, EnrichedTable, MonthlyTable, NarrowedTable, PARAMETER_COUNT};
use crate::processors::monthly_aggregator::{AggregationStats, MonthlyAggregator};

/// Attaches monthly ground-truth averages to computed averages, keyed by month
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundTruthJoiner {
    aggregator: MonthlyAggregator,
}

impl GroundTruthJoiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(
        &self,
        table: &NarrowedTable,
        monthly_columns: &[usize; PARAMETER_COUNT],
        computed: &MonthlyTable,
    ) -> EnrichedTable {
        self.join_with_stats(table, monthly_columns, computed).0
    }

    pub fn join_with_stats(
        &self,
        table: &NarrowedTable,
        monthly_columns: &[usize; PARAMETER_COUNT],
        computed: &MonthlyTable,
    ) -> (EnrichedTable, AggregationStats) {
        let (ground_truth, stats) = self.aggregator.aggregate_with_stats(table, monthly_columns);
        (Self::align(computed, &ground_truth), stats)
    }

    /// Match rows by month number, not by position
    pub fn align(computed: &MonthlyTable, ground_truth: &MonthlyTable) -> EnrichedTable {
        std::array::from_fn(|i| {
            let month = i as u32 + 1;
            let find = |table: &MonthlyTable| {
                table
                    .iter()
                    .find(|r| r.month == month)
                    .map(|r| r.values)
                    .unwrap_or([None; PARAMETER_COUNT])
            };
            EnrichedRecord {
                month,
                computed: find(computed),
                ground_truth: find(ground_truth),
            }
        })
    }
}
