use clinic_core::{DashboardConfig, DashboardError, Metric};

#[test]
fn default_config_is_valid() {
    let config = DashboardConfig::default();

    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.default_window_days, 14);
    assert_eq!(config.padding(Metric::WaitTime), 2.0);
    assert_eq!(config.padding(Metric::CareScore), 0.5);
    assert_eq!(config.tick_step(Metric::WaitTime), 20.0);
    assert_eq!(config.missing_admit_source, "Not Identified");
}

#[test]
fn partial_json_overrides_defaults() {
    let config: DashboardConfig = serde_json::from_str(r#"{"default_window_days": 7}"#)
        .expect("Không đọc được cấu hình");

    assert_eq!(config.default_window_days, 7);
    assert_eq!(config.care_score_padding, 0.5);
}

#[test]
fn invalid_values_are_rejected() {
    let zero_window = DashboardConfig {
        default_window_days: 0,
        ..DashboardConfig::default()
    };
    assert!(matches!(
        zero_window.validate(),
        Err(DashboardError::InvalidConfig(_))
    ));

    let negative_padding = DashboardConfig {
        wait_time_padding: -1.0,
        ..DashboardConfig::default()
    };
    assert!(negative_padding.validate().is_err());

    let blank_label = DashboardConfig {
        missing_admit_source: "  ".to_string(),
        ..DashboardConfig::default()
    };
    assert!(blank_label.validate().is_err());
}
