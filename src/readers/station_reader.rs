use crate::error::Result;
use crate::models::Station;
use std::path::Path;
use tracing::warn;
use validator::Validate;

pub struct StationReader {
    skip_invalid: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { skip_invalid: true }
    }

    pub fn with_skip_invalid(skip_invalid: bool) -> Self {
        Self { skip_invalid }
    }

    /// Read a `Station Details for <YEAR>.csv` table.
    ///
    /// Rows with out-of-range coordinates are dropped with a warning unless
    /// the reader was built with `with_skip_invalid(false)`.
    pub fn read_stations(&self, path: &Path) -> Result<Vec<Station>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut stations = Vec::new();
        for row in reader.deserialize::<Station>() {
            let mut station = row?;
            station.station_no = crate::models::canonical_station_no(&station.station_no);

            if let Err(e) = station.validate() {
                if self.skip_invalid {
                    warn!(station = %station.station_no, error = %e, "Skipping invalid station row");
                    continue;
                }
                return Err(e.into());
            }
            stations.push(station);
        }

        Ok(stations)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
