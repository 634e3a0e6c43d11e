//! Revenue windows and popularity rankings over a fixed clock.

mod common;

use angelic::booking::TransactionRequest;
use angelic::db::models::{Service, Staff};
use angelic::reports::Ranked;
use angelic::state::AppState;
use chrono::{DateTime, TimeZone, Utc};
use common::{add_service, add_staff, setup};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn pay(state: &AppState, service: &Service, staff: &Staff, when: DateTime<Utc>) {
    state
        .bookings
        .create_transaction_at(
            &TransactionRequest {
                service_id: Some(service.id.clone()),
                staff_id: Some(staff.id.clone()),
                client_id: None,
                client_name: Some("Walk-in".into()),
                amount_paid: Some(service.price),
                time_taken: Some(service.time_taken),
            },
            when,
        )
        .unwrap();
}

fn ranked(name: &str, transaction_count: i64) -> Ranked {
    Ranked {
        name: name.into(),
        transaction_count,
    }
}

#[test]
fn test_revenue_windows_and_rankings() {
    let (_tmp, state) = setup();
    let massage = add_service(&state, "Massage", 50.0);
    let haircut = add_service(&state, "Haircut", 20.0);
    let color = add_service(&state, "Color", 30.0);
    let lisa = add_staff(&state, "Lisa");
    let mike = add_staff(&state, "Mike");
    let zoe = add_staff(&state, "Zoe");
    let ann = add_staff(&state, "Ann");

    // Wednesday afternoon
    let now = at(2026, 10, 21, 15, 0, 0);

    pay(&state, &massage, &mike, at(2026, 10, 21, 9, 0, 0));
    pay(&state, &haircut, &zoe, now);
    // Monday midnight opens the week
    pay(&state, &massage, &mike, at(2026, 10, 19, 0, 0, 0));
    for day in 1..=6 {
        pay(&state, &color, &lisa, at(2026, 10, day, 0, 0, 0));
    }
    // Last second of the previous month
    pay(&state, &haircut, &zoe, at(2026, 9, 30, 23, 59, 59));
    // After `now`
    pay(&state, &massage, &ann, at(2026, 10, 21, 15, 0, 1));

    let report = state.reports.report_at(now).unwrap();
    assert_eq!(report.daily_revenue, 70.0);
    assert_eq!(report.weekly_revenue, 120.0);
    assert_eq!(report.monthly_revenue, 300.0);

    // Mike and Zoe tie; Mike was added first. Ann falls outside the top three.
    assert_eq!(
        report.most_booked_staff,
        vec![ranked("Lisa", 6), ranked("Mike", 2), ranked("Zoe", 2)]
    );
    assert_eq!(
        report.most_booked_service,
        vec![ranked("Color", 6), ranked("Massage", 3), ranked("Haircut", 2)]
    );

    let summary = state.reports.summary_at(now).unwrap();
    assert_eq!(summary.total_services, 3);
    assert_eq!(summary.total_staff, 4);
    assert_eq!(summary.daily_revenue, 70.0);
}

#[test]
fn test_empty_history_reports_zeroes() {
    let (_tmp, state) = setup();
    add_staff(&state, "Lisa");

    let report = state.reports.report().unwrap();
    assert_eq!(report.daily_revenue, 0.0);
    assert_eq!(report.weekly_revenue, 0.0);
    assert_eq!(report.monthly_revenue, 0.0);
    assert!(report.most_booked_staff.is_empty());
    assert!(report.most_booked_service.is_empty());
}

#[test]
fn test_report_serializes_camel_case() {
    let (_tmp, state) = setup();
    let report = state.reports.report().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    for key in [
        "dailyRevenue",
        "weeklyRevenue",
        "monthlyRevenue",
        "mostBookedStaff",
        "mostBookedService",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}
