use crate::error::Result;
use crate::models::{
    ConsolidatedObservation, EnrichedTable, MonthlyTable, NarrowedTable, Parameter,
    ParameterSchema, Station, LCD_SCHEMA_V1,
};
use crate::readers::table_reader::{
    REFINED_LATITUDE_COLUMN, REFINED_LONGITUDE_COLUMN, REFINED_NAME_COLUMN,
    REFINED_STATION_COLUMN,
};
use crate::utils::constants::MONTH_COLUMN;
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `path` through a temporary sibling that is renamed into place only
/// after `fill` succeeds. A failed write leaves any previous file untouched.
pub fn commit_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let temp = NamedTempFile::new_in(dir)?;
    fill(temp.as_file())?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;
    Ok(())
}

fn commit_csv<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<&File>) -> Result<()>,
{
    commit_file(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        fill(&mut writer)?;
        writer.flush()?;
        Ok(())
    })
}

/// Blank for missing, plain decimal otherwise
fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub struct TableWriter {
    schema: ParameterSchema,
}

impl TableWriter {
    pub fn new() -> Self {
        Self {
            schema: LCD_SCHEMA_V1,
        }
    }

    pub fn with_schema(schema: ParameterSchema) -> Self {
        Self { schema }
    }

    /// Refined table: identity columns, MONTH, then the ten schema fields
    pub fn write_refined(&self, table: &NarrowedTable, path: &Path) -> Result<()> {
        commit_csv(path, |writer| {
            let mut header = vec![
                REFINED_STATION_COLUMN,
                MONTH_COLUMN,
                REFINED_LATITUDE_COLUMN,
                REFINED_LONGITUDE_COLUMN,
                REFINED_NAME_COLUMN,
            ];
            header.extend(self.schema.fields().map(|f| f.name));
            writer.write_record(&header)?;

            for record in &table.records {
                let month = record.month.to_string();
                let mut row = vec![
                    record.station_no.as_str(),
                    month.as_str(),
                    record.latitude.as_str(),
                    record.longitude.as_str(),
                    record.name.as_str(),
                ];
                row.extend(record.values.iter().map(|v| v.as_deref().unwrap_or("")));
                writer.write_record(&row)?;
            }
            Ok(())
        })
    }

    /// Processed table: MONTH + `Computed <Parameter>` columns
    pub fn write_processed(&self, table: &MonthlyTable, path: &Path) -> Result<()> {
        commit_csv(path, |writer| {
            let mut header = vec![MONTH_COLUMN.to_string()];
            header.extend(Parameter::ALL.iter().map(Parameter::computed_column));
            writer.write_record(&header)?;

            for record in table {
                let mut row = vec![record.month.to_string()];
                row.extend(record.values.iter().map(|v| cell(*v)));
                writer.write_record(&row)?;
            }
            Ok(())
        })
    }

    /// Prepared table: processed columns followed by `GT <Parameter>` columns
    pub fn write_prepared(&self, table: &EnrichedTable, path: &Path) -> Result<()> {
        commit_csv(path, |writer| {
            let mut header = vec![MONTH_COLUMN.to_string()];
            header.extend(Parameter::ALL.iter().map(Parameter::computed_column));
            header.extend(Parameter::ALL.iter().map(Parameter::ground_truth_column));
            writer.write_record(&header)?;

            for record in table {
                let mut row = vec![record.month.to_string()];
                row.extend(record.computed.iter().map(|v| cell(*v)));
                row.extend(record.ground_truth.iter().map(|v| cell(*v)));
                writer.write_record(&row)?;
            }
            Ok(())
        })
    }

    pub fn write_consolidated(&self, rows: &[ConsolidatedObservation], path: &Path) -> Result<()> {
        commit_csv(path, |writer| {
            if rows.is_empty() {
                writer.write_record([
                    crate::utils::FILE_NO_COLUMN,
                    crate::utils::PARAMETER_COLUMN,
                    crate::utils::COMPUTED_COLUMN,
                    crate::utils::GROUND_TRUTH_COLUMN,
                ])?;
            }
            for row in rows {
                writer.serialize(row)?;
            }
            Ok(())
        })
    }

    pub fn write_stations(&self, stations: &[Station], path: &Path) -> Result<()> {
        commit_csv(path, |writer| {
            if stations.is_empty() {
                writer.write_record([
                    crate::utils::STATION_NUMBER_COLUMN,
                    crate::utils::LATITUDE_COLUMN,
                    crate::utils::LONGITUDE_COLUMN,
                    crate::utils::STATION_NAME_COLUMN,
                ])?;
            }
            for station in stations {
                writer.serialize(station)?;
            }
            Ok(())
        })
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}
