use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};

use crate::dashboard::{Dashboard, TimeFormatter, format_ppm};
use crate::ingest::latest_per_sensor;
use crate::monitor::sweep;
use crate::realtime::SubscriptionStatus;
use crate::sensor::{AlertLevel, ReadingRow, Registry, Store};

#[derive(Debug)]
pub enum Event {
    Snapshot(Result<Vec<ReadingRow>>),
    Inserted(ReadingRow),
    Status(SubscriptionStatus),
    Tick(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub offline_after: TimeDelta,
    pub bootstrap_limit: usize,
    pub formatter: TimeFormatter,
    pub log_capacity: Option<usize>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            offline_after: TimeDelta::seconds(90),
            bootstrap_limit: 1000,
            formatter: TimeFormatter::default(),
            log_capacity: None,
        }
    }
}

#[derive(Debug)]
pub struct App {
    registry: Registry,
    store: Store,
    dashboard: Dashboard,
    options: AppOptions,
}

impl App {
    pub fn new(registry: Registry, options: AppOptions) -> Self {
        let mut dashboard = Dashboard::new(&registry, options.log_capacity);
        dashboard.log("Initializing…");

        Self {
            registry,
            store: Store::new(),
            dashboard,
            options,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Applies one event. Returns whether anything visible changed.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Snapshot(Ok(rows)) => self.apply_snapshot(rows),
            Event::Snapshot(Err(err)) => {
                self.dashboard.log(format!("Initial load error: {err:#}"));
                true
            }
            Event::Inserted(row) => self.apply_insert(row),
            Event::Status(status) => self.apply_status(status),
            Event::Tick(now) => self.heartbeat(now),
        }
    }

    fn apply_snapshot(&mut self, rows: Vec<ReadingRow>) -> bool {
        let snapshot = latest_per_sensor(rows, &self.registry, self.options.bootstrap_limit);

        for row in &snapshot.latest {
            self.apply_row(row);
        }

        if !snapshot.possibly_truncated.is_empty() {
            warn!(
                "bootstrap returned {} rows without a reading for: {}",
                self.options.bootstrap_limit,
                snapshot.possibly_truncated.join(", ")
            );
        }

        let message = format!("Initial readings loaded ({} sensors).", snapshot.seen);
        self.dashboard.log(message);
        true
    }

    fn apply_insert(&mut self, row: ReadingRow) -> bool {
        if !self.apply_row(&row) {
            debug!("ignoring reading for unknown sensor: {}", row.sensor);
            return false;
        }

        self.dashboard.log(format!(
            "Received {} → {} ppm @ {}",
            row.sensor,
            format_ppm(row.ppm),
            self.options.formatter.format_opt(row.observed_at),
        ));
        true
    }

    fn apply_row(&mut self, row: &ReadingRow) -> bool {
        let Some(sensor) = self.registry.get(&row.sensor) else {
            return false;
        };

        self.store.put(&sensor.id, row.ppm, row.ratio, row.observed_at);

        let ppm = self.store.get(&sensor.id).and_then(|r| r.ppm);
        let alert = AlertLevel::classify(ppm, sensor.threshold_ppm);
        self.dashboard.show_value(&sensor.id, ppm, alert);
        true
    }

    fn apply_status(&mut self, status: SubscriptionStatus) -> bool {
        let changed = self.dashboard.set_connected(status.is_connected());
        if status.is_connected() {
            return changed;
        }

        self.dashboard.log(format!("Realtime status: {status}"));
        true
    }

    fn heartbeat(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        let offline_after = self.options.offline_after;
        for (sensor, staleness) in sweep(&self.registry, &self.store, now, offline_after) {
            let observed_at = self.store.get(&sensor.id).and_then(|r| r.observed_at);
            let last_seen = self.options.formatter.format_opt(observed_at);
            changed |= self.dashboard.show_staleness(&sensor.id, staleness, last_seen);
        }
        changed
    }
}
