use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context as _, Error, Result, bail};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::mpsc::Sender;
use tokio::time::{sleep, timeout};

use crate::app::Event;
use crate::db::listen_readings;
use crate::sensor::ReadingRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Subscribed,
    TimedOut,
    Closed,
    ChannelError,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Subscribed => "SUBSCRIBED",
            SubscriptionStatus::TimedOut => "TIMED_OUT",
            SubscriptionStatus::Closed => "CLOSED",
            SubscriptionStatus::ChannelError => "CHANNEL_ERROR",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SubscriptionStatus::Subscribed)
    }
}

impl FromStr for SubscriptionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBSCRIBED" => Ok(SubscriptionStatus::Subscribed),
            "TIMED_OUT" => Ok(SubscriptionStatus::TimedOut),
            "CLOSED" => Ok(SubscriptionStatus::Closed),
            "CHANNEL_ERROR" => Ok(SubscriptionStatus::ChannelError),
            _ => bail!("unknown subscription status: {}", s),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct InsertPayload {
    sensor: Option<Value>,
    ts: Option<Value>,
    ppm: Option<Value>,
    ratio: Option<Value>,
}

/// Parses a `row_to_json(NEW)` notification payload.
///
/// Only a missing or non-string sensor id is an error; unusable numbers and
/// timestamps become absent.
pub fn parse_insert(payload: &str) -> Result<ReadingRow> {
    let payload: InsertPayload =
        serde_json::from_str(payload).context("failed to parse insert payload")?;

    let sensor = match payload.sensor.as_ref().and_then(Value::as_str).map(str::trim) {
        Some(sensor) if !sensor.is_empty() => sensor.to_owned(),
        _ => bail!("insert payload has no sensor id"),
    };

    Ok(ReadingRow {
        sensor,
        observed_at: payload.ts.as_ref().and_then(Value::as_str).and_then(parse_ts),
        ppm: payload.ppm.as_ref().and_then(coerce_number),
        ratio: payload.ratio.as_ref().and_then(coerce_number),
    })
}

fn coerce_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    n.is_finite().then_some(n)
}

fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // `timestamp without time zone` columns serialize without an offset.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubscriptionOptions {
    pub subscribe_timeout: Duration,
    pub backoff: Backoff,
}

/// Raw insert payloads of one live subscription. `Ok(None)` means the
/// connection was lost.
pub trait PayloadSource {
    fn next_payload(&mut self) -> impl Future<Output = Result<Option<String>>> + Send;
}

pub trait Subscriber {
    type Source: PayloadSource + Send;

    fn subscribe(&self) -> impl Future<Output = Result<Self::Source>> + Send;
}

impl PayloadSource for PgListener {
    fn next_payload(&mut self) -> impl Future<Output = Result<Option<String>>> + Send {
        async move {
            let notification = self
                .try_recv()
                .await
                .context("failed to receive notification")?;
            Ok(notification.map(|n| n.payload().to_owned()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgSubscriber {
    pub pool: PgPool,
    pub channel: String,
}

impl Subscriber for PgSubscriber {
    type Source = PgListener;

    fn subscribe(&self) -> impl Future<Output = Result<PgListener>> + Send {
        listen_readings(&self.pool, &self.channel)
    }
}

/// Keeps a subscription alive and forwards inserts and status transitions
/// to the dashboard. Returns once the event queue is closed.
pub async fn run_subscription<S: Subscriber>(
    subscriber: S,
    options: SubscriptionOptions,
    tx: Sender<Event>,
) {
    let mut attempt = 0u32;

    loop {
        let status = match timeout(options.subscribe_timeout, subscriber.subscribe()).await {
            Err(_) => SubscriptionStatus::TimedOut,
            Ok(Err(err)) => {
                warn!("failed to subscribe: {err:#}");
                SubscriptionStatus::ChannelError
            }
            Ok(Ok(mut source)) => {
                info!("realtime subscription established");
                attempt = 0;
                if tx
                    .send(Event::Status(SubscriptionStatus::Subscribed))
                    .await
                    .is_err()
                {
                    return;
                }

                match forward_inserts(&mut source, &tx).await {
                    Some(status) => status,
                    None => return,
                }
            }
        };

        if tx.send(Event::Status(status)).await.is_err() {
            return;
        }

        let delay = options.backoff.delay(attempt);
        attempt = attempt.saturating_add(1);
        info!("resubscribing in {}s", delay.as_secs_f32());
        sleep(delay).await;
    }
}

/// Returns the status that ended the subscription, or `None` when the
/// dashboard went away.
async fn forward_inserts<P: PayloadSource>(
    source: &mut P,
    tx: &Sender<Event>,
) -> Option<SubscriptionStatus> {
    loop {
        let payload = match source.next_payload().await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                warn!("realtime connection lost");
                return Some(SubscriptionStatus::Closed);
            }
            Err(err) => {
                warn!("realtime channel error: {err:#}");
                return Some(SubscriptionStatus::ChannelError);
            }
        };

        let row = match parse_insert(&payload) {
            Ok(row) => row,
            Err(err) => {
                warn!("dropping realtime payload: {err:#}");
                continue;
            }
        };

        if tx.send(Event::Inserted(row)).await.is_err() {
            return None;
        }
    }
}
