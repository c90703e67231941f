//! Column layout of NOAA Local Climatological Data station-year files.
//!
//! Raw files are addressed by position. Everything downstream of the
//! field extractor works on the narrowed layout, where the ten parameter
//! columns sit at fixed narrowed indices. A change in the upstream file
//! format is a change to [`LCD_SCHEMA_V1`] only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of paired parameters (hourly observation vs. monthly ground truth)
pub const PARAMETER_COUNT: usize = 5;

/// Hourly + monthly parameter columns kept after narrowing
pub const PARAMETER_COLUMNS: usize = PARAMETER_COUNT * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "Dew Point Temperature")]
    DewPointTemperature,
    #[serde(rename = "Relative Humidity")]
    RelativeHumidity,
    #[serde(rename = "Sea Level Pressure")]
    SeaLevelPressure,
    #[serde(rename = "Station Pressure")]
    StationPressure,
    #[serde(rename = "Wet Bulb Temperature")]
    WetBulbTemperature,
}

impl Parameter {
    pub const ALL: [Parameter; PARAMETER_COUNT] = [
        Parameter::DewPointTemperature,
        Parameter::RelativeHumidity,
        Parameter::SeaLevelPressure,
        Parameter::StationPressure,
        Parameter::WetBulbTemperature,
    ];

    /// Position of this parameter in every per-parameter array
    pub fn index(self) -> usize {
        match self {
            Parameter::DewPointTemperature => 0,
            Parameter::RelativeHumidity => 1,
            Parameter::SeaLevelPressure => 2,
            Parameter::StationPressure => 3,
            Parameter::WetBulbTemperature => 4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::DewPointTemperature => "Dew Point Temperature",
            Parameter::RelativeHumidity => "Relative Humidity",
            Parameter::SeaLevelPressure => "Sea Level Pressure",
            Parameter::StationPressure => "Station Pressure",
            Parameter::WetBulbTemperature => "Wet Bulb Temperature",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.display_name() == name.trim())
    }

    /// Column header in processed tables, e.g. "Computed Relative Humidity"
    pub fn computed_column(&self) -> String {
        format!("{} {}", crate::utils::COMPUTED_PREFIX, self.display_name())
    }

    /// Column header in prepared tables, e.g. "GT Relative Humidity"
    pub fn ground_truth_column(&self) -> String {
        format!("{} {}", crate::utils::GROUND_TRUTH_PREFIX, self.display_name())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One selected parameter column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub parameter: Parameter,
    /// Position in the raw station-year file
    pub raw_offset: usize,
}

/// Identity columns kept ahead of the parameters, in raw order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityColumns {
    pub station: usize,
    pub date: usize,
    pub latitude: usize,
    pub longitude: usize,
    pub name: usize,
}

/// Versioned name -> offset table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSchema {
    pub version: &'static str,
    pub identity: IdentityColumns,
    /// Hourly observation fields, ordered by raw offset
    pub hourly: [FieldSpec; PARAMETER_COUNT],
    /// Monthly ground-truth fields, ordered by raw offset
    pub monthly: [FieldSpec; PARAMETER_COUNT],
}

pub const LCD_SCHEMA_V1: ParameterSchema = ParameterSchema {
    version: "lcd-v1",
    identity: IdentityColumns {
        station: 0,
        date: 1,
        latitude: 2,
        longitude: 3,
        name: 5,
    },
    hourly: [
        FieldSpec {
            name: "HourlyDewPointTemperature",
            parameter: Parameter::DewPointTemperature,
            raw_offset: 9,
        },
        FieldSpec {
            name: "HourlyRelativeHumidity",
            parameter: Parameter::RelativeHumidity,
            raw_offset: 15,
        },
        FieldSpec {
            name: "HourlySeaLevelPressure",
            parameter: Parameter::SeaLevelPressure,
            raw_offset: 17,
        },
        FieldSpec {
            name: "HourlyStationPressure",
            parameter: Parameter::StationPressure,
            raw_offset: 18,
        },
        FieldSpec {
            name: "HourlyWetBulbTemperature",
            parameter: Parameter::WetBulbTemperature,
            raw_offset: 20,
        },
    ],
    monthly: [
        FieldSpec {
            name: "MonthlyAverageRH",
            parameter: Parameter::RelativeHumidity,
            raw_offset: 46,
        },
        FieldSpec {
            name: "MonthlyDewpointTemperature",
            parameter: Parameter::DewPointTemperature,
            raw_offset: 59,
        },
        FieldSpec {
            name: "MonthlySeaLevelPressure",
            parameter: Parameter::SeaLevelPressure,
            raw_offset: 75,
        },
        FieldSpec {
            name: "MonthlyStationPressure",
            parameter: Parameter::StationPressure,
            raw_offset: 76,
        },
        FieldSpec {
            name: "MonthlyWetBulb",
            parameter: Parameter::WetBulbTemperature,
            raw_offset: 79,
        },
    ],
};

impl ParameterSchema {
    /// Parameter fields in narrowed order: hourly block then monthly block
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.hourly.iter().chain(self.monthly.iter())
    }

    /// Raw columns a file must have for every offset to resolve
    pub fn required_columns(&self) -> usize {
        let identity = &self.identity;
        [
            identity.station,
            identity.date,
            identity.latitude,
            identity.longitude,
            identity.name,
        ]
        .into_iter()
        .chain(self.fields().map(|f| f.raw_offset))
        .max()
        .unwrap_or(0)
            + 1
    }

    /// Narrowed column index of each parameter's hourly field, indexed by [`Parameter::index`]
    pub fn hourly_columns(&self) -> [usize; PARAMETER_COUNT] {
        Self::columns_by_parameter(&self.hourly, 0)
    }

    /// Narrowed column index of each parameter's monthly field, indexed by [`Parameter::index`]
    pub fn monthly_columns(&self) -> [usize; PARAMETER_COUNT] {
        Self::columns_by_parameter(&self.monthly, PARAMETER_COUNT)
    }

    fn columns_by_parameter(
        block: &[FieldSpec; PARAMETER_COUNT],
        base: usize,
    ) -> [usize; PARAMETER_COUNT] {
        let mut columns = [0; PARAMETER_COUNT];
        for (position, field) in block.iter().enumerate() {
            columns[field.parameter.index()] = base + position;
        }
        columns
    }
}
