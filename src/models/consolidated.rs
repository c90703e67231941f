use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::schema::Parameter;

/// One surviving (station, parameter, month) pair in the consolidated table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedObservation {
    #[serde(rename = "File No.")]
    pub file_no: String,

    #[serde(rename = "Parameter")]
    pub parameter: Parameter,

    #[serde(rename = "Computed")]
    pub computed: f64,

    #[serde(rename = "Ground Truth")]
    pub ground_truth: f64,
}

impl ConsolidatedObservation {
    pub fn new(file_no: String, parameter: Parameter, computed: f64, ground_truth: f64) -> Self {
        Self {
            file_no,
            parameter,
            computed,
            ground_truth,
        }
    }
}

/// One row of the experiment log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct YearScore {
    #[serde(rename = "Year")]
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,

    #[serde(rename = "R2 Score")]
    pub r2_score: f64,
}

impl YearScore {
    pub fn new(year: i32, r2_score: f64) -> Self {
        Self { year, r2_score }
    }

    pub fn is_consistent(&self) -> bool {
        self.r2_score >= crate::utils::constants::CONSISTENCY_THRESHOLD
    }
}
