use clinic_core::{
    aggregate_by_department, aggregate_departments, aggregate_volume, filter, metric_range,
    DashboardConfig, Dataset, FilterCriteria, HourBucket, Metric, Weekday,
};

mod support;
use support::{approx, at, day, sample_dataset, visit};

fn hour(label: &str) -> HourBucket {
    label.parse().expect("Khung giờ hợp lệ")
}

#[test]
fn single_weighted_record_fills_one_cell() {
    let dataset = Dataset::new(vec![visit(
        "A",
        "Cardiology",
        "Referral",
        at("2014-01-06", "09:30:00"),
        1,
        12.0,
        6.0,
        3,
    )]);
    let criteria = FilterCriteria::for_dates("A", day("2014-01-01"), day("2014-01-15"), ["Referral"]);

    let matrix = aggregate_volume(&filter(&dataset, &criteria));

    assert_eq!(matrix.get(Weekday::Monday, hour("09 AM")), 3);
    for weekday in Weekday::ALL {
        for bucket in HourBucket::all() {
            if weekday == Weekday::Monday && bucket == hour("09 AM") {
                continue;
            }
            assert_eq!(matrix.get(weekday, bucket), 0, "{weekday} {bucket}");
        }
    }
}

#[test]
fn matrix_total_matches_weight_sum() {
    let dataset = sample_dataset();
    let criteria = FilterCriteria::initial(&dataset, &DashboardConfig::default());
    let view = filter(&dataset, &criteria);

    let matrix = aggregate_volume(&view);

    assert_eq!(matrix.total(), view.total_records());
    assert_eq!(matrix.total(), 6);
    assert_eq!(matrix.get(Weekday::Tuesday, hour("09 AM")), 2);
    assert_eq!(matrix.get(Weekday::Wednesday, hour("12 AM")), 1);
    assert_eq!(matrix.max(), 2);
}

#[test]
fn empty_view_gives_dense_zero_matrix() {
    let dataset = sample_dataset();
    let criteria =
        FilterCriteria::for_dates("A", day("2015-01-01"), day("2015-01-15"), ["Referral"]);
    let view = filter(&dataset, &criteria);

    let matrix = aggregate_volume(&view);

    assert_eq!(matrix.rows().len(), 7);
    assert!(matrix.rows().iter().all(|row| row.len() == 24));
    assert_eq!(matrix.total(), 0);
    assert!(aggregate_departments(&view).is_empty());
    assert!(metric_range(&view, Metric::WaitTime, 2.0).is_none());
}

#[test]
fn encounter_means_average_repeated_rows() {
    let dataset = Dataset::new(vec![
        visit("A", "Cardiology", "Referral", at("2014-01-06", "08:00:00"), 1, 10.0, 4.0, 1),
        visit("A", "Cardiology", "Referral", at("2014-01-06", "10:00:00"), 1, 20.0, 6.0, 1),
        visit("A", "Cardiology", "Referral", at("2014-01-07", "11:00:00"), 2, 30.0, 8.0, 1),
    ]);
    let criteria = FilterCriteria::for_dates("A", day("2014-01-01"), day("2014-01-15"), ["Referral"]);

    let encounters = aggregate_by_department(&filter(&dataset, &criteria), "Cardiology");

    assert_eq!(encounters.len(), 2);
    assert_eq!(encounters[0].encounter, 1);
    assert!(approx(encounters[0].wait_time_min, 15.0));
    assert!(approx(encounters[0].care_score, 5.0));
    assert_eq!(encounters[1].encounter, 2);
    assert!(approx(encounters[1].wait_time_min, 30.0));
}

#[test]
fn representative_fields_come_from_first_row_in_time_order() {
    let dataset = Dataset::new(vec![
        visit("A", "Cardiology", "Referral", at("2014-01-07", "15:00:00"), 4, 10.0, 4.0, 1),
        visit("A", "Cardiology", "Referral", at("2014-01-06", "09:00:00"), 4, 20.0, 6.0, 1),
    ]);
    let criteria = FilterCriteria::for_dates("A", day("2014-01-01"), day("2014-01-15"), ["Referral"]);

    let encounters = aggregate_by_department(&filter(&dataset, &criteria), "Cardiology");

    assert_eq!(encounters.len(), 1);
    assert_eq!(encounters[0].check_in, at("2014-01-06", "09:00:00"));
    assert_eq!(encounters[0].weekday, Weekday::Monday);
    assert_eq!(encounters[0].hour, hour("09 AM"));
}

#[test]
fn department_aggregation_is_idempotent() {
    let dataset = sample_dataset();
    let criteria = FilterCriteria::initial(&dataset, &DashboardConfig::default());
    let view = filter(&dataset, &criteria);

    assert_eq!(aggregate_departments(&view), aggregate_departments(&view));
    assert_eq!(
        aggregate_by_department(&view, "Cardiology"),
        aggregate_by_department(&view, "Cardiology")
    );
}

#[test]
fn departments_aggregate_independently() {
    let dataset = sample_dataset();
    let criteria = FilterCriteria::initial(&dataset, &DashboardConfig::default());
    let view = filter(&dataset, &criteria);

    let groups = aggregate_departments(&view);
    let names: Vec<&str> = groups.iter().map(|group| group.department.as_str()).collect();

    assert_eq!(names, ["Cardiology", "Oncology", "Pediatrics"]);
    let cardiology: Vec<u64> = groups[0].encounters.iter().map(|e| e.encounter).collect();
    assert_eq!(cardiology, [1, 2]);
    assert!(aggregate_by_department(&view, "Radiology").is_empty());
}

#[test]
fn metric_ranges_pad_the_observed_extremes() {
    let dataset = sample_dataset();
    let config = DashboardConfig::default();
    let view = filter(&dataset, &FilterCriteria::initial(&dataset, &config));

    let wait = metric_range(&view, Metric::WaitTime, config.padding(Metric::WaitTime))
        .expect("Phải có khoảng thời gian chờ");
    let score = metric_range(&view, Metric::CareScore, config.padding(Metric::CareScore))
        .expect("Phải có khoảng điểm chăm sóc");

    assert!(approx(wait.min, 8.0) && approx(wait.max, 42.0));
    assert!(approx(score.min, 4.5) && approx(score.max, 8.5));
}
