use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use clinic_core::{
    DashboardConfig, DashboardController, DepartmentRow, HourBucket, Metric, Weekday,
};
use clinic_data::{load, load_bytes, load_str, LoadError};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("Invalid fixture date")
}

#[test]
fn plain_fixture_loads_with_derived_fields() {
    let dataset = load(fixture_path("clinical_sample.csv"), &DashboardConfig::default())
        .expect("Failed to load plain fixture");

    assert_eq!(dataset.len(), 6);
    assert_eq!(dataset.clinics(), ["Madison Center", "Lake Clinic"]);
    assert_eq!(dataset.departments(), ["Cardiology", "Oncology", "Pediatrics"]);
    assert_eq!(
        dataset.admit_sources(),
        [
            "Clinic Referral",
            "Not Identified",
            "Emergency Room",
            "Physician Referral"
        ]
    );
    assert_eq!(
        dataset.date_bounds(),
        Some((date("2014-01-06"), date("2014-01-21")))
    );

    let afternoon = &dataset.records()[0];
    assert_eq!(afternoon.weekday(), Weekday::Tuesday);
    assert_eq!(afternoon.hour().label(), "02 PM");
    assert_eq!(afternoon.wait_time_min, 40.5);

    let midnight = &dataset.records()[3];
    assert_eq!(midnight.weekday(), Weekday::Wednesday);
    assert_eq!(midnight.hour().label(), "12 AM");
}

#[test]
fn gzip_fixture_matches_plain_fixture() {
    let config = DashboardConfig::default();
    let plain = load(fixture_path("clinical_sample.csv"), &config).expect("Plain fixture");
    let gzip = load(fixture_path("clinical_sample.csv.gz"), &config).expect("Gzip fixture");

    assert_eq!(plain.records(), gzip.records());
}

#[test]
fn blank_admit_source_uses_configured_label() {
    let config = DashboardConfig {
        missing_admit_source: "Unknown".to_string(),
        ..DashboardConfig::default()
    };
    let dataset = load(fixture_path("clinical_sample.csv"), &config).expect("Plain fixture");

    assert_eq!(dataset.records()[1].admit_source, "Unknown");
    assert!(dataset
        .records()
        .iter()
        .all(|record| !record.admit_source.is_empty()));
}

#[test]
fn loaded_dataset_drives_the_dashboard() {
    let config = DashboardConfig::default();
    let dataset =
        load(fixture_path("clinical_sample.csv.gz"), &config).expect("Gzip fixture");
    let controller = DashboardController::new(Arc::new(dataset), config);
    let view = controller.view();

    let nine_am = HourBucket::new(9).expect("Valid hour");
    assert_eq!(view.heatmap.matrix.get(Weekday::Monday, nine_am), 4);
    assert_eq!(view.heatmap.matrix.total(), 5);

    let cardiology = view
        .table
        .row("Cardiology")
        .and_then(|row| row.scatter(Metric::WaitTime))
        .expect("Cardiology scatter");
    let encounters: Vec<u64> = cardiology.points.iter().map(|p| p.encounter).collect();
    assert_eq!(encounters, [5101, 5102]);
    assert_eq!(cardiology.points[0].x, 15.0);

    let pediatrics = view.table.row("Pediatrics").expect("Pediatrics placeholder");
    assert!(matches!(pediatrics.row, DepartmentRow::AxisReference { .. }));
}

#[test]
fn missing_column_is_reported_by_name() {
    let csv = "Clinic Name,Department,Admit Source,Check-In Time,Encounter Number,Wait Time Min,Number of Records\n";

    let err = load_str(csv, &DashboardConfig::default()).expect_err("Care Score is missing");

    assert!(matches!(err, LoadError::MissingColumn("Care Score")));
}

#[test]
fn unparseable_timestamp_is_fatal() {
    let csv = "\
Clinic Name,Department,Admit Source,Check-In Time,Encounter Number,Wait Time Min,Care Score,Number of Records
A,Cardiology,Referral,2014-01-06 21:15:00,1,10,5,1
";

    let err = load_str(csv, &DashboardConfig::default()).expect_err("24h time has no AM/PM");

    match err {
        LoadError::Timestamp { line, value } => {
            assert_eq!(line, 2);
            assert_eq!(value, "2014-01-06 21:15:00");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unparseable_number_names_the_column() {
    let csv = "\
Clinic Name,Department,Admit Source,Check-In Time,Encounter Number,Wait Time Min,Care Score,Number of Records
A,Cardiology,Referral,2014-01-06 09:15:00 AM,1,10,5,1
A,Cardiology,Referral,2014-01-06 09:30:00 AM,2,soon,5,1
";

    let err = load_str(csv, &DashboardConfig::default()).expect_err("Wait time is not numeric");

    assert!(matches!(
        err,
        LoadError::Number {
            line: 3,
            column: "Wait Time Min",
            ..
        }
    ));
}

#[test]
fn header_only_file_is_empty() {
    let csv = "Clinic Name,Department,Admit Source,Check-In Time,Encounter Number,Wait Time Min,Care Score,Number of Records\n";

    let err = load_str(csv, &DashboardConfig::default()).expect_err("No rows");

    assert!(matches!(err, LoadError::Empty));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load(fixture_path("does_not_exist.csv.gz"), &DashboardConfig::default())
        .expect_err("File does not exist");

    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("does_not_exist.csv.gz"));
}

#[test]
fn corrupt_gzip_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(&[0x1f, 0x8b, 0xff, 0x00, 0x13, 0x37])
        .expect("Failed to write temp file");

    let err = load(file.path(), &DashboardConfig::default()).expect_err("Corrupt gzip");
    assert!(matches!(err, LoadError::Csv(_)));

    let bytes = std::fs::read(fixture_path("clinical_sample.csv.gz")).expect("Gzip fixture");
    assert!(load_bytes(&bytes[..bytes.len() / 2], &DashboardConfig::default()).is_err());
}
