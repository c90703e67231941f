use crate::models::schema::PARAMETER_COLUMNS;

/// One row of a narrowed station-year table.
///
/// Identity cells are kept as raw text; the date has already been reduced
/// to its month. Parameter cells are `None` when blank in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrowedRecord {
    pub station_no: String,
    pub month: u32,
    pub latitude: String,
    pub longitude: String,
    pub name: String,
    pub values: [Option<String>; PARAMETER_COLUMNS],
}

impl NarrowedRecord {
    pub fn value(&self, column: usize) -> Option<&str> {
        self.values.get(column).and_then(|v| v.as_deref())
    }
}

/// Narrowed rows of one station file, in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NarrowedTable {
    /// File stem the table was read from (also the output file stem)
    pub station_code: String,
    pub records: Vec<NarrowedRecord>,
}

impl NarrowedTable {
    pub fn new(station_code: String, records: Vec<NarrowedRecord>) -> Self {
        Self {
            station_code,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when at least one row has a value in `column`
    pub fn column_has_values(&self, column: usize) -> bool {
        self.records.iter().any(|r| r.value(column).is_some())
    }

    /// Number of parameter columns holding at least one value
    pub fn populated_columns(&self) -> usize {
        (0..PARAMETER_COLUMNS)
            .filter(|&column| self.column_has_values(column))
            .count()
    }

    /// `(month, cell)` pairs for one column
    pub fn column(&self, column: usize) -> impl Iterator<Item = (u32, Option<&str>)> + '_ {
        self.records.iter().map(move |r| (r.month, r.value(column)))
    }

    pub fn first(&self) -> Option<&NarrowedRecord> {
        self.records.first()
    }
}
