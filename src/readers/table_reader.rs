//! Readers for the tables the pipeline hands from one stage to the next.

use crate::error::{ProcessingError, Result};
use crate::models::{
    empty_monthly_table, EnrichedRecord, EnrichedTable, MonthlyTable, NarrowedRecord,
    NarrowedTable, Parameter, ParameterSchema, LCD_SCHEMA_V1, PARAMETER_COLUMNS, PARAMETER_COUNT,
};
use crate::utils::constants::{MONTHS_PER_YEAR, MONTH_COLUMN};
use crate::utils::filename::station_code_from_path;
use csv::StringRecord;
use std::path::Path;

pub const REFINED_STATION_COLUMN: &str = "STATION";
pub const REFINED_LATITUDE_COLUMN: &str = "LATITUDE";
pub const REFINED_LONGITUDE_COLUMN: &str = "LONGITUDE";
pub const REFINED_NAME_COLUMN: &str = "NAME";

pub struct TableReader {
    schema: ParameterSchema,
}

impl TableReader {
    pub fn new() -> Self {
        Self {
            schema: LCD_SCHEMA_V1,
        }
    }

    pub fn with_schema(schema: ParameterSchema) -> Self {
        Self { schema }
    }

    /// Read a refined (narrowed) table written by the refine stage
    pub fn read_refined(&self, path: &Path) -> Result<NarrowedTable> {
        let station_code = station_code_from_path(path)?;
        let mut reader = open_csv(path)?;
        let headers = reader.headers()?.clone();

        let station = column_index(&headers, REFINED_STATION_COLUMN)?;
        let month = column_index(&headers, MONTH_COLUMN)?;
        let latitude = column_index(&headers, REFINED_LATITUDE_COLUMN)?;
        let longitude = column_index(&headers, REFINED_LONGITUDE_COLUMN)?;
        let name = column_index(&headers, REFINED_NAME_COLUMN)?;
        let mut parameter_columns = [0usize; PARAMETER_COLUMNS];
        for (slot, field) in parameter_columns.iter_mut().zip(self.schema.fields()) {
            *slot = column_index(&headers, field.name)?;
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut values: [Option<String>; PARAMETER_COLUMNS] = Default::default();
            for (slot, &column) in values.iter_mut().zip(parameter_columns.iter()) {
                *slot = non_empty(&row, column).map(str::to_string);
            }

            records.push(NarrowedRecord {
                station_no: text(&row, station),
                month: parse_month(&row, month)?,
                latitude: text(&row, latitude),
                longitude: text(&row, longitude),
                name: text(&row, name),
                values,
            });
        }

        Ok(NarrowedTable::new(station_code, records))
    }

    /// Read a processed table (`MONTH` + one `Computed ...` column per parameter)
    pub fn read_processed(&self, path: &Path) -> Result<MonthlyTable> {
        let mut reader = open_csv(path)?;
        let headers = reader.headers()?.clone();

        let month_column = column_index(&headers, MONTH_COLUMN)?;
        let computed = parameter_columns(&headers, Parameter::computed_column)?;

        let mut table = empty_monthly_table();
        for row in reader.records() {
            let row = row?;
            let month = parse_month(&row, month_column)?;
            let record = &mut table[month as usize - 1];
            for parameter in Parameter::ALL {
                record.values[parameter.index()] = parse_value(&row, computed[parameter.index()])?;
            }
        }

        Ok(table)
    }

    /// Read a prepared table (processed columns followed by `GT ...` columns)
    pub fn read_prepared(&self, path: &Path) -> Result<EnrichedTable> {
        let mut reader = open_csv(path)?;
        let headers = reader.headers()?.clone();

        let month_column = column_index(&headers, MONTH_COLUMN)?;
        let computed = parameter_columns(&headers, Parameter::computed_column)?;
        let ground_truth = parameter_columns(&headers, Parameter::ground_truth_column)?;

        let mut table: EnrichedTable = std::array::from_fn(|i| EnrichedRecord {
            month: i as u32 + 1,
            computed: [None; PARAMETER_COUNT],
            ground_truth: [None; PARAMETER_COUNT],
        });
        for row in reader.records() {
            let row = row?;
            let month = parse_month(&row, month_column)?;
            let record = &mut table[month as usize - 1];
            for parameter in Parameter::ALL {
                let i = parameter.index();
                record.computed[i] = parse_value(&row, computed[i])?;
                record.ground_truth[i] = parse_value(&row, ground_truth[i])?;
            }
        }

        Ok(table)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ProcessingError::MissingData(format!("column '{}'", name)))
}

fn parameter_columns(
    headers: &StringRecord,
    header_for: fn(&Parameter) -> String,
) -> Result<[usize; PARAMETER_COUNT]> {
    let mut columns = [0usize; PARAMETER_COUNT];
    for parameter in Parameter::ALL {
        columns[parameter.index()] = column_index(headers, &header_for(&parameter))?;
    }
    Ok(columns)
}

fn non_empty(row: &StringRecord, column: usize) -> Option<&str> {
    row.get(column).filter(|v| !v.is_empty())
}

fn text(row: &StringRecord, column: usize) -> String {
    row.get(column).unwrap_or_default().to_string()
}

/// Month cell; stage tables may store it as "3" or "3.0"
fn parse_month(row: &StringRecord, column: usize) -> Result<u32> {
    let raw = row.get(column).unwrap_or_default();
    let month = raw
        .parse::<f64>()
        .ok()
        .filter(|m| m.fract() == 0.0 && (1.0..=MONTHS_PER_YEAR as f64).contains(m))
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid month: '{}'", raw)))?;
    Ok(month as u32)
}

fn parse_value(row: &StringRecord, column: usize) -> Result<Option<f64>> {
    match non_empty(row, column) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ProcessingError::InvalidFormat(format!("Invalid value: '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_processed_fills_missing_months() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("123.csv");
        fs::write(
            &path,
            "MONTH,Computed Dew Point Temperature,Computed Relative Humidity,Computed Sea Level Pressure,Computed Station Pressure,Computed Wet Bulb Temperature\n\
             1.0,20.5,,30.1,29.9,0.0\n\
             3,21,60,,,\n",
        )?;

        let table = TableReader::new().read_processed(&path)?;

        assert_eq!(table[0].get(Parameter::DewPointTemperature), Some(20.5));
        assert_eq!(table[0].get(Parameter::RelativeHumidity), None);
        assert_eq!(table[0].get(Parameter::WetBulbTemperature), Some(0.0));
        assert_eq!(table[1].values, [None; PARAMETER_COUNT]);
        assert_eq!(table[2].get(Parameter::RelativeHumidity), Some(60.0));
        Ok(())
    }

    #[test]
    fn test_read_processed_rejects_bad_month() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("123.csv");
        fs::write(
            &path,
            "MONTH,Computed Dew Point Temperature,Computed Relative Humidity,Computed Sea Level Pressure,Computed Station Pressure,Computed Wet Bulb Temperature\n\
             13,1,1,1,1,1\n",
        )?;

        assert!(TableReader::new().read_processed(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_read_refined_requires_schema_columns() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("123.csv");
        fs::write(&path, "STATION,MONTH,LATITUDE,LONGITUDE,NAME\n123,1,1,1,X\n")?;

        let err = TableReader::new().read_refined(&path).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingData(_)));
        Ok(())
    }
}
