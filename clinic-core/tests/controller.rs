use std::sync::Arc;

use clinic_core::{
    recompute, DashboardConfig, DashboardController, DashboardEvent, DashboardState,
    DepartmentRow, HeatmapCell, HourBucket, Metric, PointStyle, Update, Weekday,
};

mod support;
use support::{day, sample_dataset};

fn controller() -> DashboardController {
    DashboardController::new(Arc::new(sample_dataset()), DashboardConfig::default())
}

fn nine_am() -> HourBucket {
    HourBucket::new(9).expect("9 giờ hợp lệ")
}

fn selected_styles(controller: &DashboardController, department: &str) -> Vec<PointStyle> {
    controller
        .view()
        .table
        .row(department)
        .and_then(|row| row.scatter(Metric::WaitTime))
        .map(|scatter| scatter.points.iter().map(|point| point.style).collect())
        .unwrap_or_default()
}

#[test]
fn controller_view_matches_pure_recompute() {
    let mut controller = controller();
    controller.apply(DashboardEvent::ClickHeatmapCell {
        weekday: Weekday::Monday,
        hour: nine_am(),
    });

    let expected = recompute(
        controller.dataset(),
        controller.state(),
        controller.config(),
    );
    assert_eq!(controller.view(), &expected);
}

#[test]
fn heatmap_click_then_reset_round_trips_selection() {
    let mut controller = controller();
    let initial = controller.view().clone();

    let update = controller.apply(DashboardEvent::ClickHeatmapCell {
        weekday: Weekday::Tuesday,
        hour: nine_am(),
    });
    assert_eq!(update, Update::Recomputed);
    assert_eq!(
        controller.state().selection.cell,
        Some(HeatmapCell {
            weekday: Weekday::Tuesday,
            hour: nine_am(),
        })
    );
    assert_eq!(controller.view().table.populated().count(), 1);

    assert_eq!(controller.apply(DashboardEvent::Reset), Update::Recomputed);
    assert!(controller.state().selection.cell.is_none());
    assert_eq!(controller.view(), &initial);
}

#[test]
fn point_click_only_rehighlights() {
    let mut controller = controller();
    let heatmap_before = controller.view().heatmap.clone();
    let aggregation_before = controller.aggregation().clone();

    let update = controller.apply(DashboardEvent::ClickScatterPoint {
        department: "Cardiology".to_string(),
        point_index: 0,
    });

    assert_eq!(update, Update::Rehighlighted);
    assert_eq!(controller.aggregation(), &aggregation_before);
    assert_eq!(controller.view().heatmap, heatmap_before);
    assert_eq!(
        selected_styles(&controller, "Cardiology"),
        [PointStyle::Selected, PointStyle::Dimmed]
    );

    assert_eq!(
        controller.apply(DashboardEvent::ClearPointSelection),
        Update::Rehighlighted
    );
    assert_eq!(
        selected_styles(&controller, "Cardiology"),
        [PointStyle::Default, PointStyle::Default]
    );
}

#[test]
fn clicking_a_missing_point_clears_selection() {
    let mut controller = controller();
    controller.apply(DashboardEvent::ClickScatterPoint {
        department: "Cardiology".to_string(),
        point_index: 1,
    });

    controller.apply(DashboardEvent::ClickScatterPoint {
        department: "Radiology".to_string(),
        point_index: 0,
    });

    assert!(controller.state().selection.point.is_none());
    assert_eq!(
        selected_styles(&controller, "Cardiology"),
        [PointStyle::Default, PointStyle::Default]
    );
}

#[test]
fn point_selection_survives_control_changes_while_valid() {
    let mut controller = controller();
    controller.apply(DashboardEvent::ClickScatterPoint {
        department: "Cardiology".to_string(),
        point_index: 1,
    });

    controller.apply(DashboardEvent::SetAdmitSources {
        admit_sources: vec!["Referral".to_string(), "Emergency".to_string()],
    });
    assert!(controller.state().selection.point.is_some());

    controller.apply(DashboardEvent::SetAdmitSources {
        admit_sources: vec!["Referral".to_string()],
    });
    assert!(controller.state().selection.point.is_none());
}

#[test]
fn control_changes_refilter_everything() {
    let mut controller = controller();

    controller.apply(DashboardEvent::SelectClinic {
        clinic: "B".to_string(),
    });
    assert_eq!(controller.view().heatmap.matrix.total(), 1);

    controller.apply(DashboardEvent::SetDateRange {
        start: day("2014-01-07"),
        end: day("2014-01-08"),
    });
    assert_eq!(controller.view().heatmap.matrix.total(), 0);
    assert!(matches!(
        controller.view().table.rows[0].row,
        DepartmentRow::AxisReference { .. }
    ));

    controller.apply(DashboardEvent::SetAdmitSources {
        admit_sources: Vec::new(),
    });
    assert!(controller.state().criteria.admit_sources.is_empty());
}

#[test]
fn events_deserialize_from_tagged_json() {
    let event: DashboardEvent = serde_json::from_str(
        r#"{"type": "click_heatmap_cell", "weekday": "Friday", "hour": "03 PM"}"#,
    )
    .expect("Không đọc được sự kiện");

    assert_eq!(
        event,
        DashboardEvent::ClickHeatmapCell {
            weekday: Weekday::Friday,
            hour: HourBucket::new(15).expect("15 giờ hợp lệ"),
        }
    );

    let reset: DashboardEvent =
        serde_json::from_str(r#"{"type": "reset"}"#).expect("Không đọc được sự kiện reset");
    assert_eq!(reset, DashboardEvent::Reset);
}

#[test]
fn stale_point_in_initial_state_is_dropped() {
    let dataset = Arc::new(sample_dataset());
    let config = DashboardConfig::default();
    let mut state = DashboardState::initial(&dataset, &config);
    state.selection.point = Some(clinic_core::PointSelection {
        department: "Pediatrics".to_string(),
        point_index: 3,
    });

    let controller = DashboardController::with_state(dataset, config, state);

    assert!(controller.state().selection.point.is_none());
}
