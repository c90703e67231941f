use crate::error::{ProcessingError, Result};
use crate::models::{ConsolidatedObservation, Parameter};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use crate::writers::csv_writer::commit_file;
use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Columnar export of the consolidated table
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn write_records(&self, records: &[ConsolidatedObservation], path: &Path) -> Result<()> {
        let schema = Self::create_schema();
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        commit_file(path, |file| {
            let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
            for chunk in records.chunks(self.row_group_size.max(1)) {
                writer.write(&Self::records_to_batch(chunk, schema.clone())?)?;
            }
            writer.close()?;
            Ok(())
        })
    }

    fn create_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("file_no", DataType::Utf8, false),
            Field::new("parameter", DataType::Utf8, false),
            Field::new("computed", DataType::Float64, false),
            Field::new("ground_truth", DataType::Float64, false),
        ]))
    }

    fn records_to_batch(
        records: &[ConsolidatedObservation],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let file_nos: Vec<&str> = records.iter().map(|r| r.file_no.as_str()).collect();
        let parameters: Vec<&str> = records.iter().map(|r| r.parameter.display_name()).collect();
        let computed: Vec<f64> = records.iter().map(|r| r.computed).collect();
        let ground_truth: Vec<f64> = records.iter().map(|r| r.ground_truth).collect();

        Ok(RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(file_nos)),
                Arc::new(StringArray::from(parameters)),
                Arc::new(Float64Array::from(computed)),
                Arc::new(Float64Array::from(ground_truth)),
            ],
        )?)
    }

    /// Read up to `limit` rows back (0 = all)
    pub fn read_records(&self, path: &Path, limit: usize) -> Result<Vec<ConsolidatedObservation>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch?;
            let file_nos = downcast::<StringArray>(&batch, 0, "file_no")?;
            let parameters = downcast::<StringArray>(&batch, 1, "parameter")?;
            let computed = downcast::<Float64Array>(&batch, 2, "computed")?;
            let ground_truth = downcast::<Float64Array>(&batch, 3, "ground_truth")?;

            for i in 0..batch.num_rows() {
                if limit > 0 && records.len() >= limit {
                    return Ok(records);
                }
                let parameter = Parameter::parse(parameters.value(i)).ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!(
                        "Unknown parameter: '{}'",
                        parameters.value(i)
                    ))
                })?;
                records.push(ConsolidatedObservation::new(
                    file_nos.value(i).to_string(),
                    parameter,
                    computed.value(i),
                    ground_truth.value(i),
                ));
            }
        }

        Ok(records)
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    column: usize,
    name: &str,
) -> Result<&'a T> {
    batch
        .column(column)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<ConsolidatedObservation> {
        vec![
            ConsolidatedObservation::new(
                "72503014732".to_string(),
                Parameter::RelativeHumidity,
                61.5,
                62.0,
            ),
            ConsolidatedObservation::new(
                "72503014732".to_string(),
                Parameter::StationPressure,
                29.91,
                29.9,
            ),
        ]
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("consolidated.parquet");
        let writer = ParquetWriter::new();

        writer.write_records(&sample(), &path)?;

        assert_eq!(writer.read_records(&path, 0)?, sample());
        assert_eq!(writer.read_records(&path, 1)?.len(), 1);
        assert_eq!(writer.get_file_info(&path)?.total_rows, 2);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let dir = TempDir::new()?;
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let path = dir.path().join(format!("{}.parquet", compression));
            let result = writer.write_records(&sample(), &path);
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }
        Ok(())
    }

    #[test]
    fn test_unknown_compression() {
        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
    }
}
