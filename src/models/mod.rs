pub mod consolidated;
pub mod monthly;
pub mod observation;
pub mod schema;
pub mod station;

pub use consolidated::{ConsolidatedObservation, YearScore};
pub use monthly::{
    empty_monthly_table, EnrichedRecord, EnrichedTable, MonthlyAverageRecord, MonthlyTable,
};
pub use observation::{NarrowedRecord, NarrowedTable};
pub use schema::{FieldSpec, Parameter, ParameterSchema, LCD_SCHEMA_V1, PARAMETER_COLUMNS, PARAMETER_COUNT};
pub use station::{canonical_station_no, Station};
