use crate::error::Result;
use crate::models::{canonical_station_no, Station};
use crate::readers::StationReader;
use crate::writers::TableWriter;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// De-duplicated station metadata for one year, keyed by canonical station number.
///
/// Owned by the stage that builds it; loaded at stage start and saved once
/// at the end of the refine stage.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: Vec<Station>,
    index: HashMap<String, usize>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows; a repeated station number keeps its first row
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let mut registry = Self::new();
        for station in stations {
            registry.insert(station);
        }
        registry
    }

    /// Load `Station Details for <YEAR>.csv`, or start empty if it does not exist yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Creating new station details table");
            return Ok(Self::new());
        }

        let registry = Self::from_stations(StationReader::new().read_stations(path)?);
        info!(
            path = %path.display(),
            stations = registry.len(),
            "Loaded station details"
        );
        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        TableWriter::new().write_stations(&self.stations, path)?;
        info!(path = %path.display(), stations = self.len(), "Saved station details");
        Ok(())
    }

    /// Register a station unless its number is already known.
    ///
    /// Returns `true` when the station was already present; the stored row
    /// is left unchanged in that case.
    pub fn lookup_or_register(
        &mut self,
        station_no: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        name: &str,
    ) -> bool {
        let station = Station::new(station_no, latitude, longitude, name.to_string());
        if self.index.contains_key(&station.station_no) {
            debug!(station = %station.station_no, "Station already registered");
            return true;
        }

        debug!(station = %station.station_no, name = %station.name, "Registered station");
        self.insert(station);
        false
    }

    fn insert(&mut self, station: Station) {
        if self.index.contains_key(&station.station_no) {
            return;
        }
        self.index
            .insert(station.station_no.clone(), self.stations.len());
        self.stations.push(station);
    }

    pub fn get(&self, station_no: &str) -> Option<&Station> {
        self.index
            .get(&canonical_station_no(station_no))
            .map(|&i| &self.stations[i])
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations lacking latitude or longitude
    pub fn useless_stations(&self) -> UselessStations {
        let mut useless = UselessStations::default();
        for station in self.stations.iter().filter(|s| !s.has_geolocation()) {
            useless.mark_useless(&station.station_no);
        }
        useless
    }
}

/// Canonicalized station numbers excluded for missing geolocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UselessStations {
    codes: HashSet<String>,
}

impl UselessStations {
    pub fn mark_useless(&mut self, station_no: &str) {
        self.codes.insert(canonical_station_no(station_no));
    }

    pub fn is_useless(&self, station_no: &str) -> bool {
        self.codes.contains(&canonical_station_no(station_no))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
