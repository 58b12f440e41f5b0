use anyhow::anyhow;
use chrono::{DateTime, TimeDelta, TimeZone as _, Utc};
use gas_dashboard::{
    app::{App, AppOptions, Event},
    dashboard::{PLACEHOLDER, Presence, TimeFormatter},
    realtime::{SubscriptionStatus, parse_insert},
    sensor::{AlertLevel, ReadingRow, Registry, SensorConfig},
};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_741_107_900 + secs, 0).unwrap()
}

fn app() -> App {
    let registry = Registry::new([
        SensorConfig::new("MQ-135", "MQ-135 (Calidad aire)", 150.0),
        SensorConfig::new("MQ-7", "MQ-7 (CO)", 50.0),
        SensorConfig::new("MQ-2", "MQ-2 (LPG/Humo)", 200.0),
    ])
    .unwrap();

    App::new(
        registry,
        AppOptions {
            offline_after: TimeDelta::seconds(90),
            bootstrap_limit: 1000,
            formatter: TimeFormatter::new(chrono_tz::UTC, "%H:%M:%S"),
            log_capacity: None,
        },
    )
}

fn row(sensor: &str, ts: i64, ppm: f64) -> ReadingRow {
    ReadingRow {
        sensor: sensor.to_owned(),
        observed_at: Some(t(ts)),
        ppm: Some(ppm),
        ratio: None,
    }
}

#[test]
fn unobserved_sensors_are_offline_and_unknown() {
    let mut app = app();
    app.handle(Event::Tick(t(0)));

    for card in app.dashboard().cards() {
        assert_eq!(card.presence, Presence::Offline);
        assert_eq!(card.last_seen, PLACEHOLDER);
        assert_eq!(card.age, PLACEHOLDER);
        assert_eq!(card.value, PLACEHOLDER);
    }
}

#[test]
fn stale_sensor_goes_offline_but_keeps_alert_level() {
    let mut app = app();
    app.handle(Event::Inserted(row("MQ-7", 0, 80.0)));

    app.handle(Event::Tick(t(30)));
    let card = app.dashboard().card("MQ-7").unwrap();
    assert_eq!(card.presence, Presence::Online);
    assert_eq!(card.alert, AlertLevel::Err);
    assert_eq!(card.age, "30 s");
    assert_eq!(card.last_seen, "17:05:00");

    app.handle(Event::Tick(t(91)));
    let card = app.dashboard().card("MQ-7").unwrap();
    assert_eq!(card.presence, Presence::Offline);
    assert_eq!(card.alert, AlertLevel::Err);
    assert_eq!(card.age, "91 s");
}

#[test]
fn alert_level_follows_threshold_of_each_sensor() {
    let mut app = app();

    app.handle(Event::Inserted(row("MQ-135", 0, 200.0)));
    assert_eq!(app.dashboard().card("MQ-135").unwrap().alert, AlertLevel::Err);

    app.handle(Event::Inserted(row("MQ-135", 1, 50.0)));
    assert_eq!(app.dashboard().card("MQ-135").unwrap().alert, AlertLevel::Ok);
    assert_eq!(app.dashboard().card("MQ-135").unwrap().value, "50.0");

    let payload = r#"{"sensor":"MQ-135","ts":"2025-03-04T17:05:00+00:00","ppm":"oops"}"#;
    app.handle(Event::Inserted(parse_insert(payload).unwrap()));
    let card = app.dashboard().card("MQ-135").unwrap();
    assert_eq!(card.alert, AlertLevel::Warn);
    assert_eq!(card.value, PLACEHOLDER);
}

#[test]
fn last_applied_observation_wins() {
    let mut app = app();
    app.handle(Event::Inserted(row("MQ-2", 10, 5.0)));
    app.handle(Event::Inserted(row("MQ-2", 5, 7.0)));

    let reading = app.store().get("MQ-2").unwrap();
    assert_eq!(reading.ppm, Some(7.0));
    assert_eq!(reading.observed_at, Some(t(5)));
    assert_eq!(app.store().len(), 1);
}

#[test]
fn bootstrap_keeps_newest_row_per_sensor() {
    let mut app = app();
    let rows = vec![row("MQ-2", 3, 5.0), row("MQ-7", 2, 80.0), row("MQ-7", 1, 10.0)];

    assert!(app.handle(Event::Snapshot(Ok(rows))));

    let mq7 = app.store().get("MQ-7").unwrap();
    assert_eq!((mq7.ppm, mq7.observed_at), (Some(80.0), Some(t(2))));
    let mq2 = app.store().get("MQ-2").unwrap();
    assert_eq!((mq2.ppm, mq2.observed_at), (Some(5.0), Some(t(3))));
    assert!(app.store().get("MQ-135").is_none());

    assert_eq!(
        app.dashboard().feed().latest(),
        Some("Initial readings loaded (2 sensors).")
    );
}

#[test]
fn bootstrap_failure_is_logged_and_live_updates_continue() {
    let mut app = app();
    app.handle(Event::Snapshot(Err(anyhow!("relation \"readings\" does not exist"))));

    assert!(app.store().is_empty());
    assert_eq!(
        app.dashboard().feed().latest(),
        Some("Initial load error: relation \"readings\" does not exist")
    );

    app.handle(Event::Status(SubscriptionStatus::Subscribed));
    app.handle(Event::Inserted(row("MQ-7", 0, 12.0)));
    assert_eq!(app.dashboard().card("MQ-7").unwrap().value, "12.0");
    assert_eq!(
        app.dashboard().feed().latest(),
        Some("Received MQ-7 → 12.0 ppm @ 17:05:00")
    );
}

#[test]
fn closed_status_disconnects_and_logs_once() {
    let mut app = app();
    app.handle(Event::Status(SubscriptionStatus::Subscribed));
    assert!(app.dashboard().is_connected());
    let before = app.dashboard().feed().len();

    app.handle(Event::Status(SubscriptionStatus::Closed));
    assert!(!app.dashboard().is_connected());
    assert_eq!(app.dashboard().feed().len(), before + 1);
    assert_eq!(app.dashboard().feed().latest(), Some("Realtime status: CLOSED"));

    app.handle(Event::Status(SubscriptionStatus::Subscribed));
    assert!(app.dashboard().is_connected());
    assert_eq!(app.dashboard().feed().len(), before + 1);
}

#[test]
fn unknown_sensor_is_ignored() {
    let mut app = app();
    let before = app.dashboard().feed().len();

    assert!(!app.handle(Event::Inserted(row("MQ-9", 0, 999.0))));

    assert!(app.store().is_empty());
    assert_eq!(app.dashboard().feed().len(), before);
    assert!(app.dashboard().card("MQ-9").is_none());
    assert!(
        app.dashboard()
            .cards()
            .all(|c| c.value == PLACEHOLDER && c.alert == AlertLevel::Warn)
    );
}
