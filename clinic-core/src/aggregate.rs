//! Tổng hợp lưu lượng theo ô thứ × giờ và trung bình chỉ số theo lượt khám.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{FilteredView, HourBucket, VisitRecord, Weekday};

/// Ma trận 7×24 tổng trọng số "Number of Records"; hàng là thứ, cột là khung giờ.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeMatrix {
    counts: [[u64; HourBucket::COUNT]; 7],
}

impl VolumeMatrix {
    pub fn get(&self, weekday: Weekday, hour: HourBucket) -> u64 {
        self.counts[weekday.index()][hour.index()]
    }

    pub fn rows(&self) -> &[[u64; HourBucket::COUNT]; 7] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Giá trị ô lớn nhất, dùng để chuẩn hóa thang màu.
    pub fn max(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    fn add(&mut self, record: &VisitRecord) {
        self.counts[record.weekday().index()][record.hour().index()] += u64::from(record.records);
    }
}

pub fn aggregate_volume(view: &FilteredView<'_>) -> VolumeMatrix {
    let mut matrix = VolumeMatrix::default();
    for record in view.iter() {
        matrix.add(record);
    }
    matrix
}

/// Chỉ số hiển thị trên bảng khoa phòng.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WaitTime,
    CareScore,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::WaitTime, Metric::CareScore];

    pub fn label(self) -> &'static str {
        match self {
            Metric::WaitTime => "Wait Time Minutes",
            Metric::CareScore => "Care Score",
        }
    }

    pub fn of_record(self, record: &VisitRecord) -> f64 {
        match self {
            Metric::WaitTime => record.wait_time_min,
            Metric::CareScore => record.care_score,
        }
    }

    pub fn of_encounter(self, encounter: &EncounterAggregate) -> f64 {
        match self {
            Metric::WaitTime => encounter.wait_time_min,
            Metric::CareScore => encounter.care_score,
        }
    }
}

/// Khoảng trục x dùng chung cho mọi hàng khoa phòng.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Vị trí tương đối của `value` trong khoảng, kẹp về [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// `[min - padding, max + padding]` của chỉ số trên toàn view; `None` khi view rỗng.
pub fn metric_range(view: &FilteredView<'_>, metric: Metric, padding: f64) -> Option<AxisRange> {
    let mut values = view
        .iter()
        .map(|record| metric.of_record(record))
        .filter(|value| value.is_finite());
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(min, max), value| {
        (min.min(value), max.max(value))
    });

    Some(AxisRange {
        min: min - padding,
        max: max + padding,
    })
}

/// Kết quả gộp các dòng cùng số lượt khám.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncounterAggregate {
    pub encounter: u64,
    pub wait_time_min: f64,
    pub care_score: f64,
    /// Thời điểm check-in của dòng đầu tiên trong nhóm.
    pub check_in: NaiveDateTime,
    pub weekday: Weekday,
    pub hour: HourBucket,
}

struct EncounterAccumulator<'a> {
    first: &'a VisitRecord,
    wait_sum: f64,
    score_sum: f64,
    rows: u32,
}

impl EncounterAccumulator<'_> {
    fn finish(self, encounter: u64) -> EncounterAggregate {
        let rows = f64::from(self.rows);
        EncounterAggregate {
            encounter,
            wait_time_min: self.wait_sum / rows,
            care_score: self.score_sum / rows,
            check_in: self.first.check_in(),
            weekday: self.first.weekday(),
            hour: self.first.hour(),
        }
    }
}

/// Gộp các dòng của một khoa theo số lượt khám, sắp theo số lượt khám tăng dần.
///
/// Trường đại diện (thời điểm, thứ, khung giờ) lấy từ dòng đầu tiên theo thứ tự của view.
pub fn aggregate_by_department(
    view: &FilteredView<'_>,
    department: &str,
) -> Vec<EncounterAggregate> {
    let mut groups: BTreeMap<u64, EncounterAccumulator<'_>> = BTreeMap::new();

    for record in view.iter().filter(|record| record.department == department) {
        let group = groups
            .entry(record.encounter)
            .or_insert_with(|| EncounterAccumulator {
                first: record,
                wait_sum: 0.0,
                score_sum: 0.0,
                rows: 0,
            });
        group.wait_sum += record.wait_time_min;
        group.score_sum += record.care_score;
        group.rows += 1;
    }

    groups
        .into_iter()
        .map(|(encounter, group)| group.finish(encounter))
        .collect()
}

/// Các lượt khám đã gộp của một khoa.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentAggregates {
    pub department: String,
    pub encounters: Vec<EncounterAggregate>,
}

/// Gộp cho từng khoa có mặt trong view, theo thứ tự xuất hiện đầu tiên.
pub fn aggregate_departments(view: &FilteredView<'_>) -> Vec<DepartmentAggregates> {
    let departments: Vec<DepartmentAggregates> = view
        .departments()
        .into_iter()
        .map(|department| DepartmentAggregates {
            department: department.to_string(),
            encounters: aggregate_by_department(view, department),
        })
        .collect();

    debug!(
        departments = departments.len(),
        encounters = departments.iter().map(|d| d.encounters.len()).sum::<usize>(),
        "aggregated encounters by department"
    );

    departments
}
