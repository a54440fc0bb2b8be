//! Logic lõi của dashboard phân tích lâm sàng: lọc lượt khám, tổng hợp lưu lượng
//! bệnh nhân và dựng view model cho heatmap cùng bảng khoa phòng.

mod aggregate;
mod calendar;
mod controller;
mod filter;
mod model;
mod view;

use serde::{Deserialize, Serialize};

pub use aggregate::{
    aggregate_by_department, aggregate_departments, aggregate_volume, metric_range, AxisRange,
    DepartmentAggregates, EncounterAggregate, Metric, VolumeMatrix,
};
pub use calendar::{HourBucket, Weekday};
pub use controller::{
    recompute, Aggregation, DashboardController, DashboardEvent, DashboardState, DashboardView,
    Update,
};
pub use filter::{filter, filter_with_selection, FilterCriteria, FilteredView};
pub use model::{Dataset, DashboardOptions, VisitRecord, MISSING_ADMIT_SOURCE};
pub use view::{
    build_department_table, build_heatmap, AxisDescriptor, CellAnnotation, ColorScale,
    DepartmentRow, DepartmentTable, DepartmentViewModel, HeatmapCell, HeatmapViewModel,
    HighlightBox, PointSelection, PointStyle, ScatterDescriptor, ScatterPoint, SelectionState,
    TableHeader,
};

/// Cấu hình các ngưỡng hiển thị và giá trị mặc định của bộ lọc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Độ dài (ngày) của khoảng thời gian mặc định trên bộ chọn ngày.
    pub default_window_days: u32,
    /// Khoảng đệm hai bên trục thời gian chờ (phút).
    pub wait_time_padding: f64,
    /// Khoảng đệm hai bên trục điểm chăm sóc.
    pub care_score_padding: f64,
    /// Bước chia vạch trục thời gian chờ trên hàng tham chiếu.
    pub wait_time_tick_step: f64,
    /// Bước chia vạch trục điểm chăm sóc trên hàng tham chiếu.
    pub care_score_tick_step: f64,
    /// Nhãn thay thế cho nguồn nhập viện bị bỏ trống.
    pub missing_admit_source: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_window_days: 14,
            wait_time_padding: 2.0,
            care_score_padding: 0.5,
            wait_time_tick_step: 20.0,
            care_score_tick_step: 0.5,
            missing_admit_source: MISSING_ADMIT_SOURCE.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Kiểm tra các giá trị cấu hình trước khi sử dụng.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.default_window_days == 0 {
            return Err(DashboardError::InvalidConfig(
                "default_window_days phải lớn hơn 0".to_string(),
            ));
        }

        for (name, value) in [
            ("wait_time_padding", self.wait_time_padding),
            ("care_score_padding", self.care_score_padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DashboardError::InvalidConfig(format!(
                    "{name} phải là số không âm"
                )));
            }
        }

        for (name, value) in [
            ("wait_time_tick_step", self.wait_time_tick_step),
            ("care_score_tick_step", self.care_score_tick_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DashboardError::InvalidConfig(format!("{name} phải lớn hơn 0")));
            }
        }

        if self.missing_admit_source.trim().is_empty() {
            return Err(DashboardError::InvalidConfig(
                "missing_admit_source không được để trống".to_string(),
            ));
        }

        Ok(())
    }

    /// Khoảng đệm trục tương ứng với chỉ số.
    pub fn padding(&self, metric: Metric) -> f64 {
        match metric {
            Metric::WaitTime => self.wait_time_padding,
            Metric::CareScore => self.care_score_padding,
        }
    }

    /// Bước chia vạch trục tương ứng với chỉ số.
    pub fn tick_step(&self, metric: Metric) -> f64 {
        match metric {
            Metric::WaitTime => self.wait_time_tick_step,
            Metric::CareScore => self.care_score_tick_step,
        }
    }
}

/// Lỗi chung của dashboard.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DashboardError {
    #[error("Không nhận diện được thứ trong tuần: {0}")]
    UnknownWeekday(String),
    #[error("Không nhận diện được khung giờ: {0}")]
    UnknownHourBucket(String),
    #[error("Cấu hình không hợp lệ: {0}")]
    InvalidConfig(String),
}
