use lcd_processor::models::{ConsolidatedObservation, Parameter, YearScore, LCD_SCHEMA_V1};
use lcd_processor::processors::{Consistency, ParquetExport, Pipeline, SentinelPolicy, SkipReason};
use lcd_processor::utils::{
    consolidated_data_path, experiment_log_path, metrics_path, stage_year_dir,
    station_details_path, ARCHIVE_DIR, PREPARED_DIR, PROCESSED_DIR, REFINED_DIR,
};
use lcd_processor::writers::{CsvExperimentLog, ExperimentLog, LogMode, MetricsSummary, ParquetWriter};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const YEAR: i32 = 2020;

/// One raw row; `cells` are (schema field name, value) pairs
fn raw_row(station: &str, date: &str, lat: &str, cells: &[(&str, &str)]) -> String {
    let mut row = vec![String::new(); LCD_SCHEMA_V1.required_columns()];
    row[0] = station.to_string();
    row[1] = date.to_string();
    row[2] = lat.to_string();
    row[3] = "-73.9692".to_string();
    row[4] = "FM-15".to_string();
    row[5] = "\"NY CITY CENTRAL PARK, NY US\"".to_string();
    for (name, value) in cells {
        let field = LCD_SCHEMA_V1
            .fields()
            .find(|f| f.name == *name)
            .expect("known field");
        row[field.raw_offset] = value.to_string();
    }
    row.join(",")
}

fn raw_header() -> String {
    let mut names: Vec<String> = (0..LCD_SCHEMA_V1.required_columns())
        .map(|i| format!("COL{}", i))
        .collect();
    for field in LCD_SCHEMA_V1.fields() {
        names[field.raw_offset] = field.name.to_string();
    }
    names.join(",")
}

fn write_raw(data_dir: &Path, file: &str, rows: &[String]) {
    let dir = stage_year_dir(data_dir, ARCHIVE_DIR, YEAR);
    fs::create_dir_all(&dir).unwrap();
    let mut content = raw_header();
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    fs::write(dir.join(file), content).unwrap();
}

fn hourly(rh: &str) -> Vec<(&'static str, String)> {
    vec![
        ("HourlyDewPointTemperature", "10".to_string()),
        ("HourlyRelativeHumidity", rh.to_string()),
        ("HourlySeaLevelPressure", "30.01".to_string()),
        ("HourlyStationPressure", "29.95s".to_string()),
        ("HourlyWetBulbTemperature", "12".to_string()),
    ]
}

fn row(station: &str, date: &str, lat: &str, cells: Vec<(&'static str, String)>) -> String {
    let borrowed: Vec<(&str, &str)> = cells.iter().map(|(n, v)| (*n, v.as_str())).collect();
    raw_row(station, date, lat, &borrowed)
}

/// Five hourly columns plus monthly relative humidity for January to March
fn central_park(data_dir: &Path) {
    let gt = |value: &str| vec![("MonthlyAverageRH", value.to_string())];
    write_raw(
        data_dir,
        "72503014732.csv",
        &[
            row("72503014732", "2020-01-01T00:51:00", "40.7789", hourly("50")),
            row("72503014732", "2020-01-01T01:51:00", "40.7789", hourly("60")),
            row("72503014732", "2020-01-31T23:59:00", "40.7789", gt("54")),
            row("72503014732", "2020-02-10T00:51:00", "40.7789", hourly("70")),
            row("72503014732", "2020-02-29T23:59:00", "40.7789", gt("71")),
            row("72503014732", "2020-03-03T00:51:00", "40.7789", hourly("40s")),
            row("72503014732", "2020-03-03T01:51:00", "40.7789", hourly("M")),
            row("72503014732", "2020-03-04T00:51:00", "40.7789", hourly("42")),
            row("72503014732", "2020-03-31T23:59:00", "40.7789", gt("41")),
        ],
    );
}

#[test]
fn test_end_to_end_single_station() {
    let dir = TempDir::new().unwrap();
    central_park(dir.path());

    let pipeline = Pipeline::new(dir.path(), YEAR).with_silent(true);
    let report = pipeline.run_all().unwrap();

    let consolidated = fs::read_to_string(consolidated_data_path(dir.path(), YEAR)).unwrap();
    let rows: Vec<ConsolidatedObservation> = csv::Reader::from_reader(consolidated.as_bytes())
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap();

    let expected: Vec<ConsolidatedObservation> = [(55.0, 54.0), (70.0, 71.0), (41.0, 41.0)]
        .iter()
        .map(|&(c, g)| {
            ConsolidatedObservation::new(
                "72503014732".to_string(),
                Parameter::RelativeHumidity,
                c,
                g,
            )
        })
        .collect();
    assert_eq!(rows, expected);

    // gt = [54, 71, 41]; SSres = 2, SStot = 452.667
    let r2 = report.evaluation.score.r2_score;
    assert!((r2 - (1.0 - 2.0 / (1358.0 / 3.0))).abs() < 1e-9);
    assert_eq!(report.evaluation.consistency, Consistency::Consistent);

    let log = CsvExperimentLog::new(&experiment_log_path(dir.path()));
    assert_eq!(log.records().unwrap(), vec![YearScore::new(YEAR, r2)]);

    let metrics = MetricsSummary::load(&metrics_path(dir.path())).unwrap();
    assert_eq!(metrics.r2_score.get("2020"), Some(&r2));

    for stage in [REFINED_DIR, PROCESSED_DIR, PREPARED_DIR] {
        assert!(stage_year_dir(dir.path(), stage, YEAR)
            .join("72503014732.csv")
            .is_file());
    }
    assert_eq!(report.summaries.len(), 4);
}

#[test]
fn test_intermediate_tables_keep_missing_cells_blank() {
    let dir = TempDir::new().unwrap();
    central_park(dir.path());

    let pipeline = Pipeline::new(dir.path(), YEAR).with_silent(true);
    pipeline.refine().unwrap();
    pipeline.process().unwrap();
    pipeline.prepare().unwrap();

    let processed = fs::read_to_string(
        stage_year_dir(dir.path(), PROCESSED_DIR, YEAR).join("72503014732.csv"),
    )
    .unwrap();
    let lines: Vec<&str> = processed.lines().collect();
    assert_eq!(
        lines[0],
        "MONTH,Computed Dew Point Temperature,Computed Relative Humidity,\
         Computed Sea Level Pressure,Computed Station Pressure,Computed Wet Bulb Temperature"
    );
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[2], "2,10,70,30.01,29.95,12");
    assert_eq!(lines[12], "12,,,,,");

    let prepared = fs::read_to_string(
        stage_year_dir(dir.path(), PREPARED_DIR, YEAR).join("72503014732.csv"),
    )
    .unwrap();
    let june = prepared.lines().nth(6).unwrap();
    assert_eq!(june, "6,,,,,,,,,,");
}

#[test]
fn test_rerun_appends_log_row() {
    let dir = TempDir::new().unwrap();
    central_park(dir.path());

    let pipeline = Pipeline::new(dir.path(), YEAR).with_silent(true);
    pipeline.run_all().unwrap();
    pipeline.evaluate().unwrap();

    let log = CsvExperimentLog::new(&experiment_log_path(dir.path()));
    assert_eq!(log.records().unwrap().len(), 2);

    Pipeline::new(dir.path(), YEAR)
        .with_silent(true)
        .with_log_mode(LogMode::ReplaceYear)
        .evaluate()
        .unwrap();
    assert_eq!(log.records().unwrap().len(), 1);
}

#[test]
fn test_skipped_stations_do_not_reach_consolidation() {
    let dir = TempDir::new().unwrap();
    central_park(dir.path());

    // No latitude: refined and registered, then dropped by process
    write_raw(
        dir.path(),
        "00099999.csv",
        &[
            row("00099999", "2020-01-01T00:51:00", "", hourly("80")),
            row("00099999", "2020-01-31T23:59:00", "", vec![("MonthlyAverageRH", "10".to_string())]),
        ],
    );
    // Only two populated columns: never refined
    write_raw(
        dir.path(),
        "11111.csv",
        &[row(
            "11111",
            "2020-05-01T00:00:00",
            "41.0",
            vec![
                ("HourlyRelativeHumidity", "50".to_string()),
                ("MonthlyAverageRH", "50".to_string()),
            ],
        )],
    );

    let pipeline = Pipeline::new(dir.path(), YEAR).with_silent(true);
    let report = pipeline.run_all().unwrap();

    let refine = &report.summaries[0];
    assert_eq!((refine.files_seen, refine.files_written), (3, 2));
    assert_eq!(refine.skipped.get(&SkipReason::InsufficientColumns), Some(&1));

    let process = &report.summaries[1];
    assert_eq!(process.skipped.get(&SkipReason::MissingGeolocation), Some(&1));

    let evaluate = &report.summaries[3];
    assert_eq!(evaluate.files_seen, 1);
    assert_eq!(evaluate.consolidated_rows, 3);

    let details = fs::read_to_string(station_details_path(dir.path(), YEAR)).unwrap();
    assert!(details.contains("99999,,-73.9692"));
}

#[test]
fn test_measured_zero_policy_changes_pairs() {
    let dir = TempDir::new().unwrap();
    let gt = |value: &str| vec![("MonthlyDewpointTemperature", value.to_string())];
    let dew = |value: &str| {
        let mut cells = hourly("50");
        cells[0].1 = value.to_string();
        cells
    };
    write_raw(
        dir.path(),
        "500.csv",
        &[
            row("500", "2020-01-01", "60.0", dew("0")),
            row("500", "2020-01-31", "60.0", gt("0")),
            row("500", "2020-02-01", "60.0", dew("0")),
            row("500", "2020-02-28", "60.0", gt("1")),
            row("500", "2020-03-01", "60.0", dew("10")),
            row("500", "2020-03-31", "60.0", gt("10")),
            row("500", "2020-04-01", "60.0", dew("20")),
            row("500", "2020-04-30", "60.0", gt("21")),
        ],
    );

    let pipeline = Pipeline::new(dir.path(), YEAR).with_silent(true);
    let default_run = pipeline.run_all().unwrap();
    assert_eq!(default_run.summaries[3].consolidated_rows, 2);

    let keep_zero = Pipeline::new(dir.path(), YEAR)
        .with_silent(true)
        .with_policy(SentinelPolicy::KeepMeasuredZero)
        .evaluate()
        .unwrap();
    assert_eq!(keep_zero.summary.consolidated_rows, 4);
    assert_eq!(keep_zero.evaluation.samples, 4);

    let consolidated = fs::read_to_string(consolidated_data_path(dir.path(), YEAR)).unwrap();
    assert!(consolidated.contains("500,Dew Point Temperature,0.0,0.0"));
}

#[test]
fn test_parquet_export_matches_csv() {
    let dir = TempDir::new().unwrap();
    central_park(dir.path());
    let parquet_path = dir.path().join("consolidated.parquet");

    let pipeline = Pipeline::new(dir.path(), YEAR)
        .with_silent(true)
        .with_policy(SentinelPolicy::ZeroIsMissing)
        .with_parquet_export(Some(ParquetExport {
            path: parquet_path.clone(),
            compression: "zstd".to_string(),
        }));
    pipeline.run_all().unwrap();

    let writer = ParquetWriter::new();
    let exported = writer.read_records(&parquet_path, 0).unwrap();
    assert_eq!(exported.len(), 3);
    assert!(exported.iter().all(|r| r.parameter == Parameter::RelativeHumidity));
}
