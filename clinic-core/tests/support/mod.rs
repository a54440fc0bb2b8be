#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use clinic_core::{Dataset, VisitRecord};

pub fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S")
        .expect("Thời điểm mẫu không hợp lệ")
}

pub fn day(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("Ngày mẫu không hợp lệ")
}

#[allow(clippy::too_many_arguments)]
pub fn visit(
    clinic: &str,
    department: &str,
    admit_source: &str,
    check_in: NaiveDateTime,
    encounter: u64,
    wait_time_min: f64,
    care_score: f64,
    records: u32,
) -> VisitRecord {
    VisitRecord::new(clinic, department, check_in, encounter)
        .with_admit_source(admit_source)
        .with_metrics(wait_time_min, care_score)
        .with_records(records)
}

/// Bộ dữ liệu nhỏ, cố ý không sắp theo thời gian.
///
/// 2014-01-06 là thứ Hai. Cửa sổ mặc định là [2014-01-06, 2014-01-20).
pub fn sample_dataset() -> Dataset {
    Dataset::new(vec![
        visit("A", "Oncology", "Referral", at("2014-01-07", "14:30:00"), 5, 40.0, 8.0, 1),
        visit("A", "Cardiology", "Referral", at("2014-01-06", "09:15:00"), 1, 10.0, 5.0, 1),
        visit("A", "Oncology", "Not Identified", at("2014-01-20", "08:00:00"), 9, 5.0, 9.0, 1),
        visit("A", "Cardiology", "Emergency", at("2014-01-07", "09:05:00"), 2, 30.0, 7.0, 2),
        visit("B", "Cardiology", "Referral", at("2014-01-06", "09:20:00"), 7, 12.0, 4.0, 1),
        visit("A", "Cardiology", "Referral", at("2014-01-06", "09:45:00"), 1, 20.0, 6.0, 1),
        visit("A", "Pediatrics", "Emergency", at("2014-01-08", "00:30:00"), 11, 15.0, 6.5, 1),
    ])
}

pub fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}
