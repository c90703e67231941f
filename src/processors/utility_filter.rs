use crate::models::NarrowedTable;
use crate::processors::station_registry::UselessStations;
use crate::utils::constants::MIN_POPULATED_COLUMNS;
use std::fmt;

/// Outcome of the usefulness check. Rejections are skips, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    Useful,
    MissingGeolocation,
    InsufficientColumns { populated: usize },
}

impl Utility {
    pub fn is_useful(&self) -> bool {
        matches!(self, Utility::Useful)
    }
}

impl fmt::Display for Utility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Utility::Useful => write!(f, "useful"),
            Utility::MissingGeolocation => write!(f, "station has no latitude/longitude"),
            Utility::InsufficientColumns { populated } => write!(
                f,
                "only {} populated parameter columns (need more than {})",
                populated, MIN_POPULATED_COLUMNS
            ),
        }
    }
}

pub struct UtilityFilter {
    min_populated_columns: usize,
}

impl UtilityFilter {
    pub fn new() -> Self {
        Self {
            min_populated_columns: MIN_POPULATED_COLUMNS,
        }
    }

    /// Strictly more than `min_populated_columns` columns must carry data
    pub fn has_enough_columns(&self, table: &NarrowedTable) -> Utility {
        let populated = table.populated_columns();
        if populated > self.min_populated_columns {
            Utility::Useful
        } else {
            Utility::InsufficientColumns { populated }
        }
    }

    /// Geolocation is looked up by the table's station code (the file stem)
    pub fn assess(&self, table: &NarrowedTable, useless: &UselessStations) -> Utility {
        if useless.is_useless(&table.station_code) {
            return Utility::MissingGeolocation;
        }
        self.has_enough_columns(table)
    }

    pub fn is_useful(&self, table: &NarrowedTable, useless: &UselessStations) -> bool {
        self.assess(table, useless).is_useful()
    }
}

impl Default for UtilityFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::observation::fixtures::record;

    fn table(code: &str, populated: usize) -> NarrowedTable {
        let mut cells = [""; 10];
        for cell in cells.iter_mut().take(populated) {
            *cell = "1";
        }
        NarrowedTable::new(code.to_string(), vec![record(1, cells)])
    }

    #[test]
    fn test_threshold_is_strictly_more_than_five() {
        let filter = UtilityFilter::new();
        let none = UselessStations::default();

        assert_eq!(
            filter.assess(&table("1", 5), &none),
            Utility::InsufficientColumns { populated: 5 }
        );
        assert_eq!(filter.assess(&table("1", 6), &none), Utility::Useful);
        assert!(filter.is_useful(&table("1", 10), &none));
    }

    #[test]
    fn test_useless_station_rejected_before_column_count() {
        let filter = UtilityFilter::new();
        let mut useless = UselessStations::default();
        useless.mark_useless("1234");

        assert_eq!(
            filter.assess(&table("0001234", 10), &useless),
            Utility::MissingGeolocation
        );
        assert!(filter.is_useful(&table("01235", 10), &useless));
    }
}
