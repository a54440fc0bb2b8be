//! Trạng thái tương tác của dashboard và vòng lọc → tổng hợp → dựng view.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::view::selection_is_valid;
use crate::{
    aggregate_departments, aggregate_volume, build_department_table, build_heatmap, filter,
    metric_range, AxisRange, DashboardConfig, Dataset, DepartmentAggregates, DepartmentTable,
    FilterCriteria, HeatmapCell, HeatmapViewModel, HourBucket, Metric, PointSelection,
    SelectionState, VolumeMatrix, Weekday,
};

/// Toàn bộ trạng thái phiên: điều kiện lọc và vùng chọn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardState {
    pub criteria: FilterCriteria,
    #[serde(default)]
    pub selection: SelectionState,
}

impl DashboardState {
    pub fn initial(dataset: &Dataset, config: &DashboardConfig) -> Self {
        Self {
            criteria: FilterCriteria::initial(dataset, config),
            selection: SelectionState::default(),
        }
    }
}

/// Những gì lớp hiển thị cần để vẽ lại dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardView {
    pub heatmap: HeatmapViewModel,
    pub table: DepartmentTable,
}

/// Kết quả tổng hợp cho một trạng thái lọc, tách khỏi vùng chọn điểm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aggregation {
    pub volume: VolumeMatrix,
    pub departments: Vec<DepartmentAggregates>,
    pub wait_time_range: Option<AxisRange>,
    pub care_score_range: Option<AxisRange>,
}

impl Aggregation {
    /// Heatmap dùng view sau lọc chính; bảng khoa phòng và khoảng trục dùng view
    /// đã thu hẹp theo ô đang chọn.
    pub fn compute(dataset: &Dataset, state: &DashboardState, config: &DashboardConfig) -> Self {
        let view = filter(dataset, &state.criteria);
        let volume = aggregate_volume(&view);

        let detail = match state.selection.cell {
            Some(cell) => view.narrow_to_cell(cell),
            None => view,
        };

        Self {
            volume,
            wait_time_range: metric_range(
                &detail,
                Metric::WaitTime,
                config.padding(Metric::WaitTime),
            ),
            care_score_range: metric_range(
                &detail,
                Metric::CareScore,
                config.padding(Metric::CareScore),
            ),
            departments: aggregate_departments(&detail),
        }
    }

    pub fn render(
        &self,
        dataset: &Dataset,
        selection: &SelectionState,
        config: &DashboardConfig,
    ) -> DashboardView {
        DashboardView {
            heatmap: build_heatmap(&self.volume, selection.cell),
            table: self.render_table(dataset, selection.point.as_ref(), config),
        }
    }

    pub fn render_table(
        &self,
        dataset: &Dataset,
        point: Option<&PointSelection>,
        config: &DashboardConfig,
    ) -> DepartmentTable {
        build_department_table(
            &self.departments,
            dataset.departments(),
            (self.wait_time_range, self.care_score_range),
            point,
            config,
        )
    }
}

/// Tính lại toàn bộ view từ trạng thái; hàm thuần, không giữ bộ nhớ đệm.
pub fn recompute(
    dataset: &Dataset,
    state: &DashboardState,
    config: &DashboardConfig,
) -> DashboardView {
    Aggregation::compute(dataset, state, config).render(dataset, &state.selection, config)
}

/// Sự kiện từ điều khiển và biểu đồ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    SelectClinic {
        clinic: String,
    },
    SetDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    SetAdmitSources {
        admit_sources: Vec<String>,
    },
    ClickHeatmapCell {
        weekday: Weekday,
        hour: HourBucket,
    },
    /// Nút "Show All": bỏ chọn ô heatmap.
    Reset,
    ClickScatterPoint {
        department: String,
        point_index: usize,
    },
    ClearPointSelection,
}

/// Mức độ cập nhật sau một sự kiện.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Update {
    /// Lọc, tổng hợp và dựng lại cả heatmap lẫn bảng.
    Recomputed,
    /// Chỉ dựng lại trạng thái tô sáng của bảng từ kết quả tổng hợp sẵn có.
    Rehighlighted,
}

/// Bộ điều khiển tương tác của một phiên làm việc.
///
/// Bộ dữ liệu dùng chung giữa các phiên; chỉ trạng thái lọc và vùng chọn là riêng.
#[derive(Debug, Clone)]
pub struct DashboardController {
    dataset: Arc<Dataset>,
    config: DashboardConfig,
    state: DashboardState,
    aggregation: Aggregation,
    view: DashboardView,
}

impl DashboardController {
    pub fn new(dataset: Arc<Dataset>, config: DashboardConfig) -> Self {
        let state = DashboardState::initial(&dataset, &config);
        Self::with_state(dataset, config, state)
    }

    pub fn with_state(
        dataset: Arc<Dataset>,
        config: DashboardConfig,
        mut state: DashboardState,
    ) -> Self {
        let aggregation = Aggregation::compute(&dataset, &state, &config);
        drop_stale_point(&mut state.selection, &aggregation);
        let view = aggregation.render(&dataset, &state.selection, &config);

        Self {
            dataset,
            config,
            state,
            aggregation,
            view,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn apply(&mut self, event: DashboardEvent) -> Update {
        debug!(?event, "applying dashboard event");

        match event {
            DashboardEvent::SelectClinic { clinic } => self.state.criteria.clinic = clinic,
            DashboardEvent::SetDateRange { start, end } => {
                self.state.criteria.set_dates(start, end)
            }
            DashboardEvent::SetAdmitSources { admit_sources } => {
                self.state.criteria.admit_sources = admit_sources.into_iter().collect()
            }
            DashboardEvent::ClickHeatmapCell { weekday, hour } => {
                self.state.selection.cell = Some(HeatmapCell { weekday, hour })
            }
            DashboardEvent::Reset => self.state.selection.cell = None,
            DashboardEvent::ClickScatterPoint {
                department,
                point_index,
            } => {
                let selection = PointSelection {
                    department,
                    point_index,
                };
                if selection_is_valid(&self.aggregation.departments, &selection) {
                    self.state.selection.point = Some(selection);
                } else {
                    warn!(
                        department = %selection.department,
                        point_index = selection.point_index,
                        "ignoring click on a point that is not rendered"
                    );
                    self.state.selection.point = None;
                }
                self.rehighlight();
                return Update::Rehighlighted;
            }
            DashboardEvent::ClearPointSelection => {
                self.state.selection.point = None;
                self.rehighlight();
                return Update::Rehighlighted;
            }
        }

        self.refresh();
        Update::Recomputed
    }

    fn refresh(&mut self) {
        self.aggregation = Aggregation::compute(&self.dataset, &self.state, &self.config);
        drop_stale_point(&mut self.state.selection, &self.aggregation);
        self.view = self
            .aggregation
            .render(&self.dataset, &self.state.selection, &self.config);
    }

    fn rehighlight(&mut self) {
        self.view.table = self.aggregation.render_table(
            &self.dataset,
            self.state.selection.point.as_ref(),
            &self.config,
        );
    }
}

fn drop_stale_point(selection: &mut SelectionState, aggregation: &Aggregation) {
    let stale = selection
        .point
        .as_ref()
        .is_some_and(|point| !selection_is_valid(&aggregation.departments, point));
    if stale {
        debug!("clearing point selection that no longer matches the table");
        selection.point = None;
    }
}
