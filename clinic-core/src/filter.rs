use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DashboardConfig, Dataset, HeatmapCell, VisitRecord};

/// Điều kiện lọc do người dùng chọn trên thẻ điều khiển.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    pub clinic: String,
    /// Mốc bắt đầu (bao gồm).
    pub start: NaiveDateTime,
    /// Mốc kết thúc (không bao gồm).
    pub end: NaiveDateTime,
    pub admit_sources: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new<I, S>(
        clinic: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        admit_sources: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clinic: clinic.into(),
            start,
            end,
            admit_sources: admit_sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Dựng điều kiện từ bộ chọn ngày: cả hai đầu tính từ 00:00:00.
    pub fn for_dates<I, S>(
        clinic: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        admit_sources: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            clinic,
            start.and_time(chrono::NaiveTime::MIN),
            end.and_time(chrono::NaiveTime::MIN),
            admit_sources,
        )
    }

    /// Giá trị mặc định: phòng khám đầu tiên, mọi nguồn nhập viện và cửa sổ
    /// `default_window_days` ngày kể từ ngày check-in sớm nhất.
    pub fn initial(dataset: &Dataset, config: &DashboardConfig) -> Self {
        let clinic = dataset.clinics().first().cloned().unwrap_or_default();
        let start = dataset
            .date_bounds()
            .map(|(first, _)| first)
            .unwrap_or_default();
        let end = start + Duration::days(i64::from(config.default_window_days));

        Self::for_dates(clinic, start, end, dataset.admit_sources().iter().cloned())
    }

    /// Đổi khoảng ngày, giữ nguyên các điều kiện còn lại.
    pub fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start = start.and_time(chrono::NaiveTime::MIN);
        self.end = end.and_time(chrono::NaiveTime::MIN);
    }

    /// Dòng thỏa đồng thời cả ba điều kiện.
    pub fn matches(&self, record: &VisitRecord) -> bool {
        self.contains_time(record.check_in()) && self.matches_categories(record)
    }

    fn contains_time(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp < self.end
    }

    fn matches_categories(&self, record: &VisitRecord) -> bool {
        record.clinic == self.clinic && self.admit_sources.contains(&record.admit_source)
    }
}

/// Tập con có thứ tự của bộ dữ liệu, sắp theo thời điểm check-in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    rows: Vec<&'a VisitRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn rows(&self) -> &[&'a VisitRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a VisitRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Thu hẹp thêm về các dòng thuộc đúng ô heatmap đã chọn.
    pub fn narrow_to_cell(&self, cell: HeatmapCell) -> FilteredView<'a> {
        FilteredView {
            rows: self
                .iter()
                .filter(|record| record.weekday() == cell.weekday && record.hour() == cell.hour)
                .collect(),
        }
    }

    /// Các khoa có mặt trong view, theo thứ tự xuất hiện đầu tiên.
    pub fn departments(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|record| record.department.as_str())
            .filter(|department| seen.insert(*department))
            .collect()
    }

    /// Tổng trọng số "Number of Records".
    pub fn total_records(&self) -> u64 {
        self.iter().map(|record| u64::from(record.records)).sum()
    }
}

/// Lọc bộ dữ liệu theo phòng khám, khoảng thời gian `[start, end)` và nguồn nhập viện.
///
/// Tập nguồn nhập viện rỗng hoặc `start > end` cho kết quả rỗng.
pub fn filter<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    if criteria.admit_sources.is_empty() || criteria.start > criteria.end {
        debug!(clinic = %criteria.clinic, "filter criteria select nothing");
        return FilteredView::default();
    }

    let records = dataset.records();
    let order = dataset.chronological_index();
    let lower = order.partition_point(|&index| records[index].check_in() < criteria.start);
    let upper = order.partition_point(|&index| records[index].check_in() < criteria.end);

    let rows: Vec<&VisitRecord> = order[lower..upper]
        .iter()
        .map(|&index| &records[index])
        .filter(|record| criteria.matches_categories(record))
        .collect();

    debug!(
        clinic = %criteria.clinic,
        window = upper - lower,
        matched = rows.len(),
        "filtered visit records"
    );

    FilteredView { rows }
}

/// Lọc chính rồi thu hẹp theo ô heatmap nếu có.
pub fn filter_with_selection<'a>(
    dataset: &'a Dataset,
    criteria: &FilterCriteria,
    cell: Option<HeatmapCell>,
) -> FilteredView<'a> {
    let view = filter(dataset, criteria);
    match cell {
        Some(cell) => view.narrow_to_cell(cell),
        None => view,
    }
}
