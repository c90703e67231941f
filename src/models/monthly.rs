use crate::models::schema::{Parameter, PARAMETER_COUNT};
use crate::utils::constants::MONTHS_PER_YEAR;

/// Per-parameter monthly means for one station. `None` = no counted samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyAverageRecord {
    pub month: u32,
    pub values: [Option<f64>; PARAMETER_COUNT],
}

impl MonthlyAverageRecord {
    pub fn empty(month: u32) -> Self {
        Self {
            month,
            values: [None; PARAMETER_COUNT],
        }
    }

    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.values[parameter.index()]
    }

    /// Value as the legacy tables store it: missing reads as 0.0
    pub fn get_or_zero(&self, parameter: Parameter) -> f64 {
        self.get(parameter).unwrap_or(0.0)
    }
}

/// Twelve rows, months 1-12 in order
pub type MonthlyTable = [MonthlyAverageRecord; MONTHS_PER_YEAR];

pub fn empty_monthly_table() -> MonthlyTable {
    std::array::from_fn(|i| MonthlyAverageRecord::empty(i as u32 + 1))
}

/// Computed averages alongside ground-truth averages for one month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichedRecord {
    pub month: u32,
    pub computed: [Option<f64>; PARAMETER_COUNT],
    pub ground_truth: [Option<f64>; PARAMETER_COUNT],
}

impl EnrichedRecord {
    pub fn pair(&self, parameter: Parameter) -> (Option<f64>, Option<f64>) {
        (
            self.computed[parameter.index()],
            self.ground_truth[parameter.index()],
        )
    }
}

pub type EnrichedTable = [EnrichedRecord; MONTHS_PER_YEAR];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_has_months_in_order() {
        let table = empty_monthly_table();
        let months: Vec<u32> = table.iter().map(|r| r.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<_>>());
        assert!(table.iter().all(|r| r.values.iter().all(Option::is_none)));
    }

    #[test]
    fn test_get_or_zero() {
        let mut record = MonthlyAverageRecord::empty(4);
        record.values[Parameter::StationPressure.index()] = Some(29.9);

        assert_eq!(record.get(Parameter::StationPressure), Some(29.9));
        assert_eq!(record.get_or_zero(Parameter::RelativeHumidity), 0.0);
    }
}
