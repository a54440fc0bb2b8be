//! View model có kiểu cố định cho heatmap lưu lượng và bảng khoa phòng.
//!
//! Lớp hiển thị chỉ cần đọc các struct này; mọi quyết định về vùng chọn,
//! trục và nhãn đã được tính sẵn ở đây.

use serde::{Deserialize, Serialize};

use crate::{
    AxisRange, DashboardConfig, DepartmentAggregates, EncounterAggregate, HourBucket, Metric,
    VolumeMatrix, Weekday,
};

/// Màu viền ô được chọn và điểm được chọn.
const HIGHLIGHT_COLOR: &str = "#ff6347";
const MARKER_COLOR: &str = "#2c82ff";

/// Ô heatmap được nhấn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HeatmapCell {
    pub weekday: Weekday,
    pub hour: HourBucket,
}

/// Điểm scatter được nhấn, xác định bởi khoa nguồn và vị trí điểm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointSelection {
    pub department: String,
    pub point_index: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionState {
    pub cell: Option<HeatmapCell>,
    pub point: Option<PointSelection>,
}

/// Hai đầu thang màu của heatmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorScale {
    pub low: String,
    pub high: String,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            low: "#caf3ff".to_string(),
            high: MARKER_COLOR.to_string(),
        }
    }
}

impl ColorScale {
    /// Nội suy tuyến tính giữa hai đầu, `t` được kẹp về [0, 1].
    pub fn color_at(&self, t: f64) -> String {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match (parse_hex(&self.low), parse_hex(&self.high)) {
            (Some(low), Some(high)) => {
                let mix = |a: u8, b: u8| -> u8 {
                    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
                };
                format!(
                    "#{:02x}{:02x}{:02x}",
                    mix(low[0], high[0]),
                    mix(low[1], high[1]),
                    mix(low[2], high[2])
                )
            }
            _ if t < 0.5 => self.low.clone(),
            _ => self.high.clone(),
        }
    }
}

fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Khung chữ nhật chuẩn hóa [0, 1] bao quanh ô được chọn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighlightBox {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub color: String,
}

impl HighlightBox {
    pub fn for_cell(cell: HeatmapCell) -> Self {
        let x0 = cell.hour.index() as f64 / HourBucket::COUNT as f64;
        let y0 = cell.weekday.index() as f64 / Weekday::ALL.len() as f64;
        Self {
            x0,
            x1: x0 + 1.0 / HourBucket::COUNT as f64,
            y0,
            y1: y0 + 1.0 / Weekday::ALL.len() as f64,
            color: HIGHLIGHT_COLOR.to_string(),
        }
    }
}

/// Nhãn số lượng trên từng ô.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellAnnotation {
    pub weekday: Weekday,
    pub hour: HourBucket,
    pub count: u64,
    pub text: String,
    pub hover: String,
    /// Ô đang được chọn: chữ lớn hơn và dùng màu nhấn.
    pub emphasized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatmapViewModel {
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub matrix: VolumeMatrix,
    /// Chú thích theo hàng (thứ) rồi tới cột (giờ).
    pub annotations: Vec<CellAnnotation>,
    pub highlight: Option<HighlightBox>,
    pub color_scale: ColorScale,
}

impl HeatmapViewModel {
    pub fn annotation(&self, weekday: Weekday, hour: HourBucket) -> Option<&CellAnnotation> {
        self.annotations
            .get(weekday.index() * HourBucket::COUNT + hour.index())
    }

    /// Màu nền của ô theo thang màu, chuẩn hóa theo ô lớn nhất.
    pub fn cell_color(&self, weekday: Weekday, hour: HourBucket) -> String {
        let max = self.matrix.max();
        if max == 0 {
            return self.color_scale.color_at(0.0);
        }
        self.color_scale
            .color_at(self.matrix.get(weekday, hour) as f64 / max as f64)
    }
}

pub fn build_heatmap(matrix: &VolumeMatrix, selected: Option<HeatmapCell>) -> HeatmapViewModel {
    let mut annotations = Vec::with_capacity(Weekday::ALL.len() * HourBucket::COUNT);
    for weekday in Weekday::ALL {
        for hour in HourBucket::all() {
            let count = matrix.get(weekday, hour);
            annotations.push(CellAnnotation {
                weekday,
                hour,
                count,
                text: count.to_string(),
                hover: format!("{weekday}  {hour}\n{count} Patient Records"),
                emphasized: selected == Some(HeatmapCell { weekday, hour }),
            });
        }
    }

    HeatmapViewModel {
        x_labels: HourBucket::all().map(HourBucket::label).collect(),
        y_labels: Weekday::ALL.iter().map(|day| day.label().to_string()).collect(),
        matrix: matrix.clone(),
        annotations,
        highlight: selected.map(HighlightBox::for_cell),
        color_scale: ColorScale::default(),
    }
}

/// Trạng thái hiển thị của một điểm scatter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointStyle {
    /// Không có điểm nào được chọn.
    Default,
    Selected,
    /// Có điểm khác đang được chọn.
    Dimmed,
}

impl PointStyle {
    pub fn color(self) -> &'static str {
        match self {
            PointStyle::Selected => HIGHLIGHT_COLOR,
            PointStyle::Default | PointStyle::Dimmed => MARKER_COLOR,
        }
    }

    pub fn opacity(self) -> f64 {
        match self {
            PointStyle::Default | PointStyle::Selected => 1.0,
            PointStyle::Dimmed => 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub encounter: u64,
    pub tooltip: String,
    pub style: PointStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AxisDescriptor {
    pub range: Option<AxisRange>,
    pub show_tick_labels: bool,
    pub tick0: Option<f64>,
    pub dtick: Option<f64>,
}

impl AxisDescriptor {
    /// Trục ẩn của biểu đồ trong hàng khoa phòng.
    pub fn hidden(range: Option<AxisRange>) -> Self {
        Self {
            range,
            show_tick_labels: false,
            tick0: None,
            dtick: None,
        }
    }

    /// Trục hiện vạch chia của hàng tham chiếu.
    pub fn reference(range: Option<AxisRange>, dtick: f64) -> Self {
        Self {
            range,
            show_tick_labels: true,
            tick0: Some(0.0),
            dtick: Some(dtick),
        }
    }

    /// Các vạch chia nằm trong khoảng trục, bắt đầu từ `tick0` với bước `dtick`.
    pub fn ticks(&self) -> Vec<f64> {
        let (Some(range), Some(tick0), Some(dtick)) = (self.range, self.tick0, self.dtick) else {
            return Vec::new();
        };
        if dtick <= 0.0 || !range.span().is_finite() {
            return Vec::new();
        }

        let first = ((range.min - tick0) / dtick).ceil() as i64;
        let last = ((range.max - tick0) / dtick).floor() as i64;
        (first..=last).map(|step| tick0 + step as f64 * dtick).collect()
    }
}

/// Biểu đồ scatter ngang của một chỉ số cho một khoa; mọi điểm có y là nhãn khoa.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScatterDescriptor {
    pub metric: Metric,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    pub axis: AxisDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DepartmentRow {
    Populated {
        wait_time: ScatterDescriptor,
        care_score: ScatterDescriptor,
    },
    /// Hàng trống đầu tiên: ẩn nhãn, chỉ hiện trục để giữ ngữ cảnh thang đo.
    AxisReference {
        wait_time: AxisDescriptor,
        care_score: AxisDescriptor,
    },
    Hidden,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentViewModel {
    pub department: String,
    pub row: DepartmentRow,
}

impl DepartmentViewModel {
    pub fn is_visible(&self) -> bool {
        !matches!(self.row, DepartmentRow::Hidden)
    }

    pub fn scatter(&self, metric: Metric) -> Option<&ScatterDescriptor> {
        match (&self.row, metric) {
            (DepartmentRow::Populated { wait_time, .. }, Metric::WaitTime) => Some(wait_time),
            (DepartmentRow::Populated { care_score, .. }, Metric::CareScore) => Some(care_score),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableHeader {
    pub department: String,
    pub wait_time: String,
    pub care_score: String,
}

impl Default for TableHeader {
    fn default() -> Self {
        Self {
            department: "Department".to_string(),
            wait_time: Metric::WaitTime.label().to_string(),
            care_score: Metric::CareScore.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentTable {
    pub header: TableHeader,
    pub rows: Vec<DepartmentViewModel>,
    pub wait_time_range: Option<AxisRange>,
    pub care_score_range: Option<AxisRange>,
}

impl DepartmentTable {
    pub fn row(&self, department: &str) -> Option<&DepartmentViewModel> {
        self.rows.iter().find(|row| row.department == department)
    }

    pub fn populated(&self) -> impl Iterator<Item = &DepartmentViewModel> {
        self.rows
            .iter()
            .filter(|row| matches!(row.row, DepartmentRow::Populated { .. }))
    }
}

/// Dựng bảng khoa phòng: khoa có dữ liệu trước, sau đó là các khoa còn lại của
/// bộ dữ liệu dưới dạng hàng giữ chỗ.
///
/// Vùng chọn điểm không còn hợp lệ (khoa vắng mặt hoặc vị trí vượt quá số điểm)
/// được coi như không chọn.
pub fn build_department_table(
    aggregates: &[DepartmentAggregates],
    all_departments: &[String],
    ranges: (Option<AxisRange>, Option<AxisRange>),
    point: Option<&PointSelection>,
    config: &DashboardConfig,
) -> DepartmentTable {
    let (wait_time_range, care_score_range) = ranges;
    let point = point.filter(|selection| selection_is_valid(aggregates, selection));

    let mut rows: Vec<DepartmentViewModel> = aggregates
        .iter()
        .map(|group| DepartmentViewModel {
            department: group.department.clone(),
            row: DepartmentRow::Populated {
                wait_time: build_scatter(group, Metric::WaitTime, wait_time_range, point),
                care_score: build_scatter(group, Metric::CareScore, care_score_range, point),
            },
        })
        .collect();

    let placeholders = all_departments
        .iter()
        .filter(|department| !aggregates.iter().any(|group| &group.department == *department));

    for (position, department) in placeholders.enumerate() {
        let row = if position == 0 {
            DepartmentRow::AxisReference {
                wait_time: AxisDescriptor::reference(
                    wait_time_range,
                    config.tick_step(Metric::WaitTime),
                ),
                care_score: AxisDescriptor::reference(
                    care_score_range,
                    config.tick_step(Metric::CareScore),
                ),
            }
        } else {
            DepartmentRow::Hidden
        };
        rows.push(DepartmentViewModel {
            department: department.clone(),
            row,
        });
    }

    DepartmentTable {
        header: TableHeader::default(),
        rows,
        wait_time_range,
        care_score_range,
    }
}

pub(crate) fn selection_is_valid(
    aggregates: &[DepartmentAggregates],
    selection: &PointSelection,
) -> bool {
    aggregates
        .iter()
        .find(|group| group.department == selection.department)
        .is_some_and(|group| selection.point_index < group.encounters.len())
}

fn build_scatter(
    group: &DepartmentAggregates,
    metric: Metric,
    range: Option<AxisRange>,
    point: Option<&PointSelection>,
) -> ScatterDescriptor {
    let points = group
        .encounters
        .iter()
        .enumerate()
        .map(|(index, encounter)| ScatterPoint {
            x: metric.of_encounter(encounter),
            encounter: encounter.encounter,
            tooltip: encounter_tooltip(encounter),
            style: point_style(&group.department, index, point),
        })
        .collect();

    ScatterDescriptor {
        metric,
        y_label: group.department.clone(),
        points,
        axis: AxisDescriptor::hidden(range),
    }
}

fn point_style(department: &str, index: usize, point: Option<&PointSelection>) -> PointStyle {
    match point {
        None => PointStyle::Default,
        Some(selection) if selection.department == department && selection.point_index == index => {
            PointStyle::Selected
        }
        Some(_) => PointStyle::Dimmed,
    }
}

fn encounter_tooltip(encounter: &EncounterAggregate) -> String {
    format!(
        "Patient #: {}\nCheck-in Time: {} {} {}\nWait Time: {:.1} Minutes, Care Score: {:.1}",
        encounter.encounter,
        encounter.check_in.format("%Y-%m-%d"),
        encounter.weekday,
        encounter.hour,
        encounter.wait_time_min,
        encounter.care_score
    )
}
