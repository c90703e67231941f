pub mod consolidation_scorer;
pub mod ground_truth_joiner;
pub mod monthly_aggregator;
pub mod pipeline;
pub mod run_summary;
pub mod station_registry;
pub mod utility_filter;

pub use consolidation_scorer::{r2_score, Consistency, ConsolidationScorer, Evaluation, SentinelPolicy};
pub use ground_truth_joiner::GroundTruthJoiner;
pub use monthly_aggregator::{parse_numeric, AggregationStats, MonthlyAggregator};
pub use pipeline::{EvaluationReport, ParquetExport, Pipeline, PipelineReport};
pub use run_summary::{RunSummary, SkipReason, Stage};
pub use station_registry::{StationRegistry, UselessStations};
pub use utility_filter::{Utility, UtilityFilter};
