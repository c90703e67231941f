use serde::{Deserialize, Serialize};
use validator::Validate;

/// Canonical form of a station number.
///
/// Purely numeric codes lose their leading zeros ("0012345" -> "12345");
/// anything else is kept verbatim.
pub fn canonical_station_no(station_no: &str) -> String {
    let trimmed = station_no.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = trimmed.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Station {
    #[serde(rename = "Station Number")]
    #[validate(length(min = 1))]
    pub station_no: String,

    #[serde(rename = "Latitude")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[serde(rename = "Station Name")]
    pub name: String,
}

impl Station {
    /// Build a station record; the number is stored canonicalized.
    pub fn new(
        station_no: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        name: String,
    ) -> Self {
        Self {
            station_no: canonical_station_no(station_no),
            latitude,
            longitude,
            name,
        }
    }

    pub fn has_geolocation(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}
