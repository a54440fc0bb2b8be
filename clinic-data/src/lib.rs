//! Loader for the clinical analytics export (`clinical_analytics.csv.gz`).
//!
//! The file is read once at startup into an immutable [`Dataset`]. Gzip input is
//! recognised by its magic bytes, so plain CSV works as well.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use clinic_core::{DashboardConfig, Dataset, VisitRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use tracing::info;

/// Format of the `Check-In Time` column, e.g. `2014-01-06 09:15:00 AM`.
pub const CHECK_IN_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const CLINIC: &str = "Clinic Name";
const DEPARTMENT: &str = "Department";
const ADMIT_SOURCE: &str = "Admit Source";
const CHECK_IN: &str = "Check-In Time";
const ENCOUNTER: &str = "Encounter Number";
const WAIT_TIME: &str = "Wait Time Min";
const CARE_SCORE: &str = "Care Score";
const RECORDS: &str = "Number of Records";

/// Errors raised while loading the dataset. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: cannot parse check-in time {value:?} (expected YYYY-MM-DD hh:mm:ss AM/PM)")]
    Timestamp { line: u64, value: String },
    #[error("line {line}: column `{column}` is not a valid number: {value:?}")]
    Number {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("dataset contains no records")]
    Empty,
}

/// Load the dataset from a file on disk.
pub fn load(path: impl AsRef<Path>, config: &DashboardConfig) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_bytes(&bytes, config)
}

/// Load the dataset from raw bytes, decompressing gzip input when present.
pub fn load_bytes(bytes: &[u8], config: &DashboardConfig) -> Result<Dataset, LoadError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        load_reader(GzDecoder::new(bytes), config)
    } else {
        load_reader(bytes, config)
    }
}

/// Load the dataset from uncompressed CSV text.
pub fn load_str(csv_text: &str, config: &DashboardConfig) -> Result<Dataset, LoadError> {
    load_reader(csv_text.as_bytes(), config)
}

/// Load the dataset from any uncompressed CSV reader.
pub fn load_reader<R: Read>(reader: R, config: &DashboardConfig) -> Result<Dataset, LoadError> {
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = Columns::locate(csv.headers()?)?;

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();
        records.push(columns.parse_row(&row, line, config)?);
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    let dataset = Dataset::new(records);
    info!(
        rows = dataset.len(),
        clinics = dataset.clinics().len(),
        departments = dataset.departments().len(),
        admit_sources = dataset.admit_sources().len(),
        "loaded clinical analytics dataset"
    );
    Ok(dataset)
}

/// Positions of the required columns in the header row.
struct Columns {
    clinic: usize,
    department: usize,
    admit_source: usize,
    check_in: usize,
    encounter: usize,
    wait_time: usize,
    care_score: usize,
    records: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}') == name)
                .ok_or(LoadError::MissingColumn(name))
        };

        Ok(Self {
            clinic: find(CLINIC)?,
            department: find(DEPARTMENT)?,
            admit_source: find(ADMIT_SOURCE)?,
            check_in: find(CHECK_IN)?,
            encounter: find(ENCOUNTER)?,
            wait_time: find(WAIT_TIME)?,
            care_score: find(CARE_SCORE)?,
            records: find(RECORDS)?,
        })
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        line: u64,
        config: &DashboardConfig,
    ) -> Result<VisitRecord, LoadError> {
        let field = |index: usize| row.get(index).unwrap_or_default();

        let check_in = parse_check_in(field(self.check_in), line)?;
        let admit_source = match field(self.admit_source) {
            "" => config.missing_admit_source.clone(),
            value => value.to_string(),
        };

        Ok(VisitRecord::new(
            field(self.clinic),
            field(self.department),
            check_in,
            parse_number(field(self.encounter), ENCOUNTER, line)?,
        )
        .with_admit_source(admit_source)
        .with_metrics(
            parse_number(field(self.wait_time), WAIT_TIME, line)?,
            parse_number(field(self.care_score), CARE_SCORE, line)?,
        )
        .with_records(parse_number(field(self.records), RECORDS, line)?))
    }
}

fn parse_check_in(value: &str, line: u64) -> Result<NaiveDateTime, LoadError> {
    NaiveDateTime::parse_from_str(value, CHECK_IN_FORMAT).map_err(|_| LoadError::Timestamp {
        line,
        value: value.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    column: &'static str,
    line: u64,
) -> Result<T, LoadError> {
    value.parse().map_err(|_| LoadError::Number {
        line,
        column,
        value: value.to_string(),
    })
}
