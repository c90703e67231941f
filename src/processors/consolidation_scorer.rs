use crate::error::{ProcessingError, Result};
use crate::models::{ConsolidatedObservation, EnrichedTable, Parameter, YearScore};
use crate::utils::constants::CONSISTENCY_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a 0.0 monthly average is treated when pairing computed and ground truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentinelPolicy {
    /// Zero means "no data" on either side; genuine zero measurements are lost
    #[default]
    ZeroIsMissing,
    /// Only absent values are dropped
    KeepMeasuredZero,
}

impl SentinelPolicy {
    fn usable(&self, value: Option<f64>) -> Option<f64> {
        match (self, value) {
            (_, None) => None,
            (SentinelPolicy::ZeroIsMissing, Some(v)) if v == 0.0 => None,
            (_, Some(v)) => Some(v),
        }
    }

    /// Both sides survive or the pair is dropped together
    pub fn keep(&self, computed: Option<f64>, ground_truth: Option<f64>) -> Option<(f64, f64)> {
        Some((self.usable(computed)?, self.usable(ground_truth)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    Consistent,
    Inconsistent,
}

impl Consistency {
    pub fn classify(r2_score: f64) -> Self {
        if r2_score >= CONSISTENCY_THRESHOLD {
            Consistency::Consistent
        } else {
            Consistency::Inconsistent
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consistency::Consistent => write!(f, "consistent"),
            Consistency::Inconsistent => write!(f, "not consistent"),
        }
    }
}

/// Result of scoring one year's consolidated table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub score: YearScore,
    pub samples: usize,
    pub consistency: Consistency,
}

/// Coefficient of determination of `computed` against `ground_truth`.
///
/// Pooled over every pair. A constant ground-truth vector scores 1.0 on an
/// exact match and 0.0 otherwise.
pub fn r2_score(computed: &[f64], ground_truth: &[f64]) -> Result<f64> {
    if computed.len() != ground_truth.len() {
        return Err(ProcessingError::InvalidFormat(format!(
            "Mismatched vectors: {} computed vs {} ground truth values",
            computed.len(),
            ground_truth.len()
        )));
    }
    let samples = ground_truth.len();
    if samples < 2 {
        return Err(ProcessingError::UndefinedScore { samples });
    }

    let mean = ground_truth.iter().sum::<f64>() / samples as f64;
    let ss_res: f64 = computed
        .iter()
        .zip(ground_truth)
        .map(|(c, g)| (g - c).powi(2))
        .sum();
    let ss_tot: f64 = ground_truth.iter().map(|g| (g - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Flattens enriched station tables into scored pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationScorer {
    policy: SentinelPolicy,
}

impl ConsolidationScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SentinelPolicy) -> Self {
        Self { policy }
    }

    /// Rows are ordered station, then parameter, then month
    pub fn consolidate(&self, stations: &[(String, EnrichedTable)]) -> Vec<ConsolidatedObservation> {
        let mut rows = Vec::new();
        for (file_no, table) in stations {
            for parameter in Parameter::ALL {
                for record in table {
                    let (computed, ground_truth) = record.pair(parameter);
                    if let Some((c, g)) = self.policy.keep(computed, ground_truth) {
                        rows.push(ConsolidatedObservation::new(file_no.clone(), parameter, c, g));
                    }
                }
            }
        }
        rows
    }

    pub fn score(&self, rows: &[ConsolidatedObservation]) -> Result<f64> {
        let computed: Vec<f64> = rows.iter().map(|r| r.computed).collect();
        let ground_truth: Vec<f64> = rows.iter().map(|r| r.ground_truth).collect();
        r2_score(&computed, &ground_truth)
    }

    pub fn evaluate(&self, year: i32, rows: &[ConsolidatedObservation]) -> Result<Evaluation> {
        let r2 = self.score(rows)?;
        Ok(Evaluation {
            score: YearScore::new(year, r2),
            samples: rows.len(),
            consistency: Consistency::classify(r2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrichedRecord;

    fn station(pairs: &[(u32, Parameter, Option<f64>, Option<f64>)]) -> EnrichedTable {
        let mut table: EnrichedTable = std::array::from_fn(|i| EnrichedRecord {
            month: i as u32 + 1,
            computed: [None; 5],
            ground_truth: [None; 5],
        });
        for &(month, parameter, c, g) in pairs {
            let record = &mut table[month as usize - 1];
            record.computed[parameter.index()] = c;
            record.ground_truth[parameter.index()] = g;
        }
        table
    }

    #[test]
    fn test_zero_sentinel_drops_pair() {
        let scorer = ConsolidationScorer::new();
        let table = station(&[
            (1, Parameter::RelativeHumidity, Some(0.0001), Some(0.0)),
            (2, Parameter::RelativeHumidity, Some(5.0), Some(5.0)),
            (3, Parameter::RelativeHumidity, Some(0.0), Some(4.0)),
            (4, Parameter::RelativeHumidity, None, Some(4.0)),
        ]);

        let rows = scorer.consolidate(&[("725030".to_string(), table)]);

        assert_eq!(
            rows,
            vec![ConsolidatedObservation::new(
                "725030".to_string(),
                Parameter::RelativeHumidity,
                5.0,
                5.0
            )]
        );
    }

    #[test]
    fn test_keep_measured_zero_policy() {
        let scorer = ConsolidationScorer::with_policy(SentinelPolicy::KeepMeasuredZero);
        let table = station(&[
            (1, Parameter::SeaLevelPressure, Some(0.0001), Some(0.0)),
            (2, Parameter::SeaLevelPressure, None, Some(1.0)),
        ]);

        let rows = scorer.consolidate(&[("1".to_string(), table)]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ground_truth, 0.0);
    }

    #[test]
    fn test_rows_ordered_station_parameter_month() {
        let scorer = ConsolidationScorer::new();
        let a = station(&[
            (5, Parameter::WetBulbTemperature, Some(1.0), Some(1.0)),
            (2, Parameter::DewPointTemperature, Some(2.0), Some(2.0)),
            (1, Parameter::WetBulbTemperature, Some(3.0), Some(3.0)),
        ]);
        let b = station(&[(1, Parameter::DewPointTemperature, Some(4.0), Some(4.0))]);

        let rows = scorer.consolidate(&[("a".to_string(), a), ("b".to_string(), b)]);
        let order: Vec<(&str, Parameter, f64)> = rows
            .iter()
            .map(|r| (r.file_no.as_str(), r.parameter, r.computed))
            .collect();

        assert_eq!(
            order,
            vec![
                ("a", Parameter::DewPointTemperature, 2.0),
                ("a", Parameter::WetBulbTemperature, 3.0),
                ("a", Parameter::WetBulbTemperature, 1.0),
                ("b", Parameter::DewPointTemperature, 4.0),
            ]
        );
    }

    #[test]
    fn test_perfect_match_is_consistent() -> Result<()> {
        let rows: Vec<_> = [10.0, 20.0, 35.5]
            .iter()
            .map(|&v| ConsolidatedObservation::new("1".to_string(), Parameter::StationPressure, v, v))
            .collect();

        let evaluation = ConsolidationScorer::new().evaluate(2020, &rows)?;

        assert_eq!(evaluation.score.r2_score, 1.0);
        assert_eq!(evaluation.consistency, Consistency::Consistent);
        assert!(evaluation.score.is_consistent());
        assert_eq!(evaluation.samples, 3);
        Ok(())
    }

    #[test]
    fn test_r2_matches_reference_value() -> Result<()> {
        // y = [3, -0.5, 2, 7], yhat = [2.5, 0.0, 2, 8]
        let r2 = r2_score(&[2.5, 0.0, 2.0, 8.0], &[3.0, -0.5, 2.0, 7.0])?;
        assert!((r2 - 0.948_608_137_044_968_1).abs() < 1e-12);
        assert_eq!(Consistency::classify(r2), Consistency::Consistent);
        assert_eq!(Consistency::classify(0.89), Consistency::Inconsistent);
        Ok(())
    }

    #[test]
    fn test_undefined_score() {
        assert!(matches!(
            ConsolidationScorer::new().score(&[]),
            Err(ProcessingError::UndefinedScore { samples: 0 })
        ));
        assert!(matches!(
            r2_score(&[1.0], &[1.0]),
            Err(ProcessingError::UndefinedScore { samples: 1 })
        ));
    }

    #[test]
    fn test_constant_ground_truth() -> Result<()> {
        assert_eq!(r2_score(&[4.0, 4.0], &[4.0, 4.0])?, 1.0);
        assert_eq!(r2_score(&[3.0, 5.0], &[4.0, 4.0])?, 0.0);
        Ok(())
    }
}
