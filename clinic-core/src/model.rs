use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{HourBucket, Weekday};

/// Nhãn mặc định cho nguồn nhập viện bị bỏ trống.
pub const MISSING_ADMIT_SOURCE: &str = "Not Identified";

/// Một lượt check-in của bệnh nhân.
///
/// Thứ và khung giờ được tính một lần từ thời điểm check-in và không đổi sau đó.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VisitRecord {
    pub clinic: String,
    pub department: String,
    pub admit_source: String,
    pub encounter: u64,
    pub wait_time_min: f64,
    pub care_score: f64,
    /// Trọng số "Number of Records" của dòng.
    pub records: u32,
    check_in: NaiveDateTime,
    weekday: Weekday,
    hour: HourBucket,
}

impl VisitRecord {
    pub fn new(
        clinic: impl Into<String>,
        department: impl Into<String>,
        check_in: NaiveDateTime,
        encounter: u64,
    ) -> Self {
        Self {
            clinic: clinic.into(),
            department: department.into(),
            admit_source: MISSING_ADMIT_SOURCE.to_string(),
            encounter,
            wait_time_min: 0.0,
            care_score: 0.0,
            records: 1,
            check_in,
            weekday: Weekday::of(&check_in),
            hour: HourBucket::of(&check_in),
        }
    }

    pub fn with_admit_source(mut self, admit_source: impl Into<String>) -> Self {
        self.admit_source = admit_source.into();
        self
    }

    pub fn with_metrics(mut self, wait_time_min: f64, care_score: f64) -> Self {
        self.wait_time_min = wait_time_min;
        self.care_score = care_score;
        self
    }

    pub fn with_records(mut self, records: u32) -> Self {
        self.records = records;
        self
    }

    pub fn check_in(&self) -> NaiveDateTime {
        self.check_in
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn hour(&self) -> HourBucket {
        self.hour
    }
}

/// Bộ dữ liệu bất biến nạp một lần khi khởi động.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<VisitRecord>,
    /// Chỉ số dòng sắp theo thời điểm check-in; dòng trùng thời điểm giữ thứ tự file.
    chronological: Vec<usize>,
    clinics: Vec<String>,
    admit_sources: Vec<String>,
    departments: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<VisitRecord>) -> Self {
        let mut chronological: Vec<usize> = (0..records.len()).collect();
        chronological.sort_by_key(|&index| records[index].check_in);

        Self {
            clinics: distinct(records.iter().map(|record| record.clinic.as_str())),
            admit_sources: distinct(records.iter().map(|record| record.admit_source.as_str())),
            departments: distinct(records.iter().map(|record| record.department.as_str())),
            chronological,
            records,
        }
    }

    /// Các dòng theo thứ tự trong file.
    pub fn records(&self) -> &[VisitRecord] {
        &self.records
    }

    /// Các dòng theo thứ tự thời gian check-in tăng dần.
    pub fn chronological(&self) -> impl DoubleEndedIterator<Item = &VisitRecord> + '_ {
        self.chronological.iter().map(|&index| &self.records[index])
    }

    pub(crate) fn chronological_index(&self) -> &[usize] {
        &self.chronological
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clinics(&self) -> &[String] {
        &self.clinics
    }

    pub fn admit_sources(&self) -> &[String] {
        &self.admit_sources
    }

    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    /// Ngày check-in sớm nhất và muộn nhất.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.chronological().next()?;
        let last = self.chronological().next_back()?;
        Some((first.check_in.date(), last.check_in.date()))
    }

    /// Danh sách lựa chọn cho các điều khiển giao diện.
    pub fn options(&self) -> DashboardOptions {
        let (min_date, max_date) = match self.date_bounds() {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };

        DashboardOptions {
            clinics: self.clinics.clone(),
            admit_sources: self.admit_sources.clone(),
            departments: self.departments.clone(),
            min_date,
            max_date,
        }
    }
}

/// Giá trị dùng để điền các ô chọn phòng khám, nguồn nhập viện và khoảng ngày.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardOptions {
    pub clinics: Vec<String>,
    pub admit_sources: Vec<String>,
    pub departments: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}
