#![forbid(unsafe_code)]

use chrono::{DateTime, Duration, Local, TimeZone};
use ledger::{DeviceStatus, StatusLedger};
use pretty_assertions::assert_eq;

fn t0() -> DateTime<Local> {
    // A Wednesday.
    Local.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap()
}

#[test]
fn tracks_a_device_through_three_states() {
    let ledger = StatusLedger::in_memory();

    ledger.record_at("PI-65", DeviceStatus::Offline, t0());
    ledger.record_at("PI-65", DeviceStatus::Reachable, t0() + Duration::seconds(10));
    ledger.record_at("PI-65", DeviceStatus::Running, t0() + Duration::seconds(25));

    let stats = ledger.stats_at("PI-65", t0() + Duration::seconds(30));
    assert_eq!(stats.offline_seconds, 10.0);
    assert_eq!(stats.online_seconds, 15.0);
    assert_eq!(stats.running_seconds, 5.0);
    assert_eq!(stats.offline, "00:00:10");
    assert_eq!(stats.online, "00:00:15");
    assert_eq!(stats.running, "00:00:05");
    assert_eq!(stats.current_status, DeviceStatus::Running);
    assert_eq!(stats.current_duration, "00:00:05");
}

#[test]
fn querying_is_idempotent() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Running, t0());

    let now = t0() + Duration::seconds(42);
    let first = ledger.stats_at("PI-65", now);
    let second = ledger.stats_at("PI-65", now);
    assert_eq!(first, second);

    // The unrealized time was never written back.
    let realized = ledger.stats_at("PI-65", t0());
    assert_eq!(realized.running_seconds, 0.0);
}

#[test]
fn unknown_device_is_all_zero_offline() {
    let ledger = StatusLedger::in_memory();
    let stats = ledger.stats_at("GHOST", t0());
    assert_eq!(stats.current_status, DeviceStatus::Offline);
    assert_eq!(stats.running_seconds, 0.0);
    assert_eq!(stats.online_seconds, 0.0);
    assert_eq!(stats.offline_seconds, 0.0);
    assert_eq!(stats.current_duration, "00:00:00");
}

#[test]
fn repeated_status_still_flushes_the_accumulators() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Running, t0());
    ledger.record_at("PI-65", DeviceStatus::Running, t0() + Duration::seconds(30));

    // The 30s are realized; the open transition restarted at the last poll.
    let stats = ledger.stats_at("PI-65", t0() + Duration::seconds(30));
    assert_eq!(stats.running_seconds, 30.0);
    assert_eq!(stats.current_duration, "00:00:00");
}

#[test]
fn clock_regression_clamps_to_zero() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Running, t0());
    ledger.record_at("PI-65", DeviceStatus::Offline, t0() - Duration::seconds(120));

    let stats = ledger.stats_at("PI-65", t0() - Duration::seconds(120));
    assert_eq!(stats.running_seconds, 0.0);
    assert_eq!(stats.offline_seconds, 0.0);
    assert_eq!(stats.current_status, DeviceStatus::Offline);
}

#[test]
fn daily_attribution_touches_exactly_one_date() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("D", DeviceStatus::Running, t0());
    ledger.record_at("D", DeviceStatus::Offline, t0() + Duration::seconds(90));

    let records = ledger.all_daily_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records["2026-08-05"]["D"].running, 90.0);
    assert_eq!(records["2026-08-05"]["D"].offline, 0.0);
}

#[test]
fn midnight_spanning_transition_closes_on_the_recording_date() {
    let ledger = StatusLedger::in_memory();
    let late = Local.with_ymd_and_hms(2026, 8, 5, 23, 50, 0).unwrap();
    let past_midnight = Local.with_ymd_and_hms(2026, 8, 6, 0, 10, 0).unwrap();

    ledger.record_at("PI-65", DeviceStatus::Running, late);
    ledger.record_at("PI-65", DeviceStatus::Running, past_midnight);

    // The whole 20 minutes land on the closing date.
    let records = ledger.all_daily_records();
    assert!(!records.contains_key("2026-08-05"));
    assert_eq!(records["2026-08-06"]["PI-65"].running, 1200.0);
}

#[test]
fn daily_stats_returns_one_date() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Reachable, t0());
    ledger.record_at("PI-65", DeviceStatus::Offline, t0() + Duration::seconds(60));

    let day = ledger.daily_stats("2026-08-05");
    assert_eq!(day["PI-65"].online, 60.0);
    assert!(ledger.daily_stats("2026-08-04").is_empty());
}

#[test]
fn weekly_stats_cover_monday_through_sunday() {
    let ledger = StatusLedger::in_memory();
    let monday = Local.with_ymd_and_hms(2026, 8, 3, 10, 0, 0).unwrap();
    let sunday = Local.with_ymd_and_hms(2026, 8, 9, 10, 0, 0).unwrap();
    let previous_sunday = Local.with_ymd_and_hms(2026, 8, 2, 10, 0, 0).unwrap();

    for start in [previous_sunday, monday, sunday] {
        ledger.record_at("PI-65", DeviceStatus::Running, start);
        ledger.record_at("PI-65", DeviceStatus::Offline, start + Duration::seconds(600));
    }

    // Queried mid-week: both in-week days count, last week's Sunday does not.
    let weekly = ledger.weekly_stats_at(t0());
    assert_eq!(weekly["PI-65"].running, 1200.0);
}

#[test]
fn monthly_stats_select_one_calendar_month() {
    let ledger = StatusLedger::in_memory();
    let july = Local.with_ymd_and_hms(2026, 7, 31, 10, 0, 0).unwrap();

    ledger.record_at("PI-64", DeviceStatus::Running, july);
    ledger.record_at("PI-64", DeviceStatus::Running, july + Duration::seconds(300));
    ledger.record_at("PI-65", DeviceStatus::Running, t0());
    ledger.record_at("PI-65", DeviceStatus::Running, t0() + Duration::seconds(120));

    let july_stats = ledger.monthly_stats_at(Some(2026), Some(7), t0());
    assert_eq!(july_stats["PI-64"].running, 300.0);
    assert!(!july_stats.contains_key("PI-65"));

    // Defaults to the month containing `now`.
    let august = ledger.monthly_stats_at(None, None, t0());
    assert_eq!(august["PI-65"].running, 120.0);
    assert!(!august.contains_key("PI-64"));

    assert!(ledger.monthly_stats_at(Some(2026), Some(6), t0()).is_empty());
}

#[test]
fn all_devices_stats_spans_history_and_live_table() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Running, t0());
    ledger.record_at("PI-65", DeviceStatus::Offline, t0() + Duration::seconds(10));
    ledger.record_at("PI-66", DeviceStatus::Reachable, t0());

    let all = ledger.all_devices_stats_at(t0() + Duration::seconds(20));
    assert_eq!(all.len(), 2);
    assert_eq!(all["PI-65"].running_seconds, 10.0);
    assert_eq!(all["PI-66"].current_status, DeviceStatus::Reachable);
}

#[test]
fn daily_records_are_a_deep_copy() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Running, t0());
    ledger.record_at("PI-65", DeviceStatus::Offline, t0() + Duration::seconds(10));

    let mut records = ledger.all_daily_records();
    records.clear();

    assert_eq!(ledger.all_daily_records().len(), 1);
}

#[test]
fn resetting_one_device_keeps_its_daily_history() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Running, t0());
    ledger.record_at("PI-65", DeviceStatus::Offline, t0() + Duration::seconds(30));

    ledger.reset_stats_at(Some("PI-65"), t0() + Duration::seconds(60)).unwrap();

    let stats = ledger.stats_at("PI-65", t0() + Duration::seconds(60));
    assert_eq!(stats.running_seconds, 0.0);
    assert_eq!(stats.offline_seconds, 0.0);
    assert_eq!(stats.current_status, DeviceStatus::Offline);
    assert_eq!(stats.current_duration, "00:00:00");

    assert_eq!(ledger.all_daily_records()["2026-08-05"]["PI-65"].running, 30.0);
}

#[test]
fn resetting_everything_restarts_the_clock() {
    let ledger = StatusLedger::in_memory();
    ledger.record_at("PI-65", DeviceStatus::Running, t0());
    ledger.record_at("PI-65", DeviceStatus::Offline, t0() + Duration::seconds(30));

    let reset_at = t0() + Duration::seconds(3600);
    ledger.reset_stats_at(None, reset_at).unwrap();

    assert!(ledger.all_daily_records().is_empty());
    assert!(ledger.all_devices_stats_at(reset_at).is_empty());
    assert_eq!(ledger.start_time(), reset_at);
    assert_eq!(ledger.uptime_at(reset_at + Duration::seconds(61)), "00:01:01");
}

#[test]
fn uptime_formats_from_start_time() {
    let store = std::sync::Arc::new(ledger::NoopStore);
    let ledger = StatusLedger::open_at(store, t0());
    assert_eq!(ledger.uptime_at(t0() + Duration::seconds(3723)), "01:02:03");
    assert_eq!(ledger.start_time_string(), "2026-08-05 09:00:00");
}
