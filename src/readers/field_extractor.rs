use crate::error::{ProcessingError, Result};
use crate::models::{NarrowedRecord, NarrowedTable, ParameterSchema, LCD_SCHEMA_V1, PARAMETER_COLUMNS};
use crate::utils::filename::station_code_from_path;
use csv::StringRecord;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Month of an ISO-like timestamp (`YYYY-MM-...`). Only the month digits are
/// read, so the day part is never validated.
pub fn month_from_date(value: &str) -> Option<u32> {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() < 8
        || !bytes[..4].iter().all(u8::is_ascii_digit)
        || bytes[4] != b'-'
        || !bytes[5..7].iter().all(u8::is_ascii_digit)
        || bytes[7] != b'-'
    {
        return None;
    }
    let month: u32 = value.get(5..7)?.parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Narrows raw station-year files to the identity columns plus the ten
/// schema parameter columns, replacing the date with its month.
pub struct FieldExtractor {
    schema: ParameterSchema,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            schema: LCD_SCHEMA_V1,
        }
    }

    pub fn with_schema(schema: ParameterSchema) -> Self {
        Self { schema }
    }

    /// Read and narrow one raw file; the file stem becomes the table's station code
    pub fn extract(&self, path: &Path) -> Result<NarrowedTable> {
        let station_code = station_code_from_path(path)?;
        let bytes = std::fs::read(path)?;
        let content = decode_station_file(&bytes);
        let table = self.extract_from_str(&station_code, &content)?;

        debug!(
            file = %path.display(),
            rows = table.len(),
            "Narrowed station file"
        );
        Ok(table)
    }

    /// Narrow CSV text (header row first)
    pub fn extract_from_str(&self, station_code: &str, content: &str) -> Result<NarrowedTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let required = self.schema.required_columns();
        let header_len = reader.headers()?.len();
        if header_len < required {
            return Err(ProcessingError::MissingColumn {
                required,
                found: header_len,
            });
        }

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            records.push(self.narrow_row(&row, index + 1)?);
        }

        Ok(NarrowedTable::new(station_code.to_string(), records))
    }

    fn narrow_row(&self, row: &StringRecord, row_no: usize) -> Result<NarrowedRecord> {
        let required = self.schema.required_columns();
        if row.len() < required {
            return Err(ProcessingError::MissingColumn {
                required,
                found: row.len(),
            });
        }

        let identity = &self.schema.identity;
        let cell = |offset: usize| row.get(offset).unwrap_or_default();

        let date = cell(identity.date);
        let month = month_from_date(date).ok_or_else(|| ProcessingError::MalformedDate {
            value: date.to_string(),
            row: row_no,
        })?;

        let mut values: [Option<String>; PARAMETER_COLUMNS] = Default::default();
        for (slot, field) in values.iter_mut().zip(self.schema.fields()) {
            let raw = cell(field.raw_offset);
            if !raw.is_empty() {
                *slot = Some(raw.to_string());
            }
        }

        Ok(NarrowedRecord {
            station_no: cell(identity.station).to_string(),
            month,
            latitude: cell(identity.latitude).to_string(),
            longitude: cell(identity.longitude).to_string(),
            name: cell(identity.name).to_string(),
            values,
        })
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Station names occasionally arrive Latin-1 encoded; fall back to
/// Windows-1252 when the bytes are not valid UTF-8.
fn decode_station_file(bytes: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        let (text, _, _) = WINDOWS_1252.decode(bytes);
        text
    } else {
        text
    }
}
