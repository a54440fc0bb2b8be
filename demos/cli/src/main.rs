use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clinic_core::{
    DashboardConfig, DashboardController, DashboardEvent, DepartmentRow, HeatmapCell,
    HeatmapViewModel, Metric, PointSelection, ScatterDescriptor, Weekday,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clinic-cli",
    about = "Phân tích lưu lượng bệnh nhân, thời gian chờ và điểm chăm sóc từ file CSV."
)]
struct Cli {
    /// Đường dẫn tới file dữ liệu (.csv hoặc .csv.gz).
    #[arg(short, long)]
    input: PathBuf,

    /// File cấu hình JSON (tùy chọn).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mức log khi không đặt RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Liệt kê phòng khám, nguồn nhập viện, khoa và khoảng ngày.
    Options,
    /// In heatmap lưu lượng theo thứ × khung giờ.
    Heatmap(FilterArgs),
    /// In bảng thời gian chờ và điểm chăm sóc theo khoa.
    Departments(FilterArgs),
    /// Xuất toàn bộ trạng thái và view model dạng JSON.
    Dashboard(FilterArgs),
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Tên phòng khám (mặc định: phòng khám đầu tiên trong file).
    #[arg(long)]
    clinic: Option<String>,

    /// Ngày bắt đầu, YYYY-MM-DD (bao gồm).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Ngày kết thúc, YYYY-MM-DD (không bao gồm).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Nguồn nhập viện; lặp lại để chọn nhiều (mặc định: tất cả).
    #[arg(long = "admit-source")]
    admit_sources: Vec<String>,

    /// Ô heatmap, ví dụ "Tuesday,09 AM".
    #[arg(long, value_parser = parse_cell)]
    cell: Option<HeatmapCell>,

    /// Điểm scatter, ví dụ "Cardiology,0".
    #[arg(long, value_parser = parse_point)]
    point: Option<PointSelection>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("Mức log không hợp lệ")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;
    let dataset = clinic_data::load(&cli.input, &config)
        .with_context(|| format!("Không đọc được file {:?}", cli.input))?;
    let dataset = Arc::new(dataset);

    match cli.command {
        Command::Options => {
            let options = dataset.options();
            println!("Clinics: {}", options.clinics.join(", "));
            println!("Admit sources: {}", options.admit_sources.join(", "));
            println!("Departments: {}", options.departments.join(", "));
            if let (Some(min), Some(max)) = (options.min_date, options.max_date) {
                println!("Check-in dates: {min} .. {max}");
            }
        }
        Command::Heatmap(args) => {
            let controller = build_controller(dataset, config, args);
            print_heatmap(&controller.view().heatmap);
        }
        Command::Departments(args) => {
            let controller = build_controller(dataset, config, args);
            print_departments(&controller);
        }
        Command::Dashboard(args) => {
            let controller = build_controller(dataset, config, args);
            let output = serde_json::json!({
                "state": controller.state(),
                "view": controller.view(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DashboardConfig> {
    let Some(path) = path else {
        return Ok(DashboardConfig::default());
    };

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file cấu hình {path:?}"))?;
    let config: DashboardConfig = serde_json::from_str(&data)
        .with_context(|| format!("Cấu hình {path:?} không hợp lệ"))?;
    config.validate()?;
    Ok(config)
}

/// Áp các tham số dòng lệnh như một chuỗi sự kiện giao diện.
fn build_controller(
    dataset: Arc<clinic_core::Dataset>,
    config: DashboardConfig,
    args: FilterArgs,
) -> DashboardController {
    let mut controller = DashboardController::new(dataset, config);

    if let Some(clinic) = args.clinic {
        controller.apply(DashboardEvent::SelectClinic { clinic });
    }

    if args.start.is_some() || args.end.is_some() {
        let criteria = &controller.state().criteria;
        let start = args.start.unwrap_or(criteria.start.date());
        let end = args.end.unwrap_or(criteria.end.date());
        controller.apply(DashboardEvent::SetDateRange { start, end });
    }

    if !args.admit_sources.is_empty() {
        controller.apply(DashboardEvent::SetAdmitSources {
            admit_sources: args.admit_sources,
        });
    }

    if let Some(cell) = args.cell {
        controller.apply(DashboardEvent::ClickHeatmapCell {
            weekday: cell.weekday,
            hour: cell.hour,
        });
    }

    if let Some(point) = args.point {
        controller.apply(DashboardEvent::ClickScatterPoint {
            department: point.department,
            point_index: point.point_index,
        });
    }

    let criteria = &controller.state().criteria;
    info!(
        clinic = %criteria.clinic,
        start = %criteria.start,
        end = %criteria.end,
        "dashboard ready"
    );
    controller
}

fn print_heatmap(heatmap: &HeatmapViewModel) {
    print!("{:<10}", "");
    for label in &heatmap.x_labels {
        print!("{label:>6}");
    }
    println!();

    for weekday in Weekday::ALL {
        print!("{:<10}", weekday.label());
        for annotation in heatmap
            .annotations
            .iter()
            .filter(|annotation| annotation.weekday == weekday)
        {
            let text = if annotation.emphasized {
                format!("[{}]", annotation.text)
            } else {
                annotation.text.clone()
            };
            print!("{text:>6}");
        }
        println!();
    }

    println!("Total patient records: {}", heatmap.matrix.total());
}

fn print_departments(controller: &DashboardController) {
    let table = &controller.view().table;
    println!(
        "{:<24} {:<28} {}",
        table.header.department, table.header.wait_time, table.header.care_score
    );

    for row in &table.rows {
        match &row.row {
            DepartmentRow::Populated {
                wait_time,
                care_score,
            } => {
                println!(
                    "{:<24} {:<28} {}",
                    row.department,
                    summarize(wait_time),
                    summarize(care_score)
                );
                for point in &wait_time.points {
                    let marker = match point.style {
                        clinic_core::PointStyle::Selected => "*",
                        clinic_core::PointStyle::Dimmed => ".",
                        clinic_core::PointStyle::Default => "-",
                    };
                    println!("  {marker} {}", point.tooltip.replace('\n', " | "));
                }
            }
            DepartmentRow::AxisReference {
                wait_time,
                care_score,
            } => {
                println!(
                    "{:<24} {:<28} {}",
                    "(axis)",
                    format_ticks(&wait_time.ticks()),
                    format_ticks(&care_score.ticks())
                );
            }
            DepartmentRow::Hidden => {}
        }
    }
}

fn summarize(scatter: &ScatterDescriptor) -> String {
    let count = scatter.points.len();
    let mean = scatter.points.iter().map(|point| point.x).sum::<f64>() / count.max(1) as f64;
    let unit = match scatter.metric {
        Metric::WaitTime => " min",
        Metric::CareScore => "",
    };
    format!("{count} patients, avg {mean:.1}{unit}")
}

fn format_ticks(ticks: &[f64]) -> String {
    ticks
        .iter()
        .map(|tick| format!("{tick}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_cell(value: &str) -> Result<HeatmapCell, String> {
    let (weekday, hour) = value
        .split_once(',')
        .ok_or_else(|| format!("Cần dạng \"<Thứ>,<Khung giờ>\", nhận {value:?}"))?;
    Ok(HeatmapCell {
        weekday: weekday.parse().map_err(|err| format!("{err}"))?,
        hour: hour.parse().map_err(|err| format!("{err}"))?,
    })
}

fn parse_point(value: &str) -> Result<PointSelection, String> {
    let (department, index) = value
        .rsplit_once(',')
        .ok_or_else(|| format!("Cần dạng \"<Khoa>,<Vị trí>\", nhận {value:?}"))?;
    Ok(PointSelection {
        department: department.trim().to_string(),
        point_index: index
            .trim()
            .parse()
            .map_err(|err| format!("Vị trí điểm không hợp lệ: {err}"))?,
    })
}
