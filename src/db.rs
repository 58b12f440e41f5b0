use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgListener, PgPoolOptions};
use sqlx::{FromRow, PgPool};

use crate::sensor::ReadingRow;

pub async fn new_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await
        .context("failed to open connection pool")
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("failed to run migrations")
}

/// Channel names end up inside a trigger definition, so only plain
/// identifiers are accepted.
pub fn parse_channel(channel: &str) -> Result<String> {
    let Some(first) = channel.chars().next() else {
        bail!("channel name is empty");
    };
    if channel.len() > 63 {
        bail!("channel name longer than 63 bytes: {channel}");
    }
    if first.is_ascii_digit() || !channel.chars().all(is_identifier_char) {
        bail!("channel name must be letters, digits and underscores: {channel}");
    }

    Ok(channel.to_owned())
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn notify_trigger_sql(channel: &str) -> Result<String> {
    let channel = parse_channel(channel)?;
    Ok(format!(
        "CREATE TRIGGER readings_notify_insert \
         AFTER INSERT ON readings \
         FOR EACH ROW EXECUTE FUNCTION notify_reading_insert('{channel}')"
    ))
}

/// Points the insert trigger at `channel`.
pub async fn install_notify_trigger(pool: &PgPool, channel: &str) -> Result<()> {
    let create = notify_trigger_sql(channel)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query("DROP TRIGGER IF EXISTS readings_notify_insert ON readings")
        .execute(&mut *tx)
        .await
        .context("failed to drop insert trigger")?;
    sqlx::query(&create)
        .execute(&mut *tx)
        .await
        .context("failed to create insert trigger")?;

    tx.commit().await.context("failed to commit transaction")?;

    Ok(())
}

#[derive(Debug, FromRow)]
struct ReadingRecord {
    sensor: Option<String>,
    ts: Option<DateTime<Utc>>,
    ppm: Option<f64>,
    ratio: Option<f64>,
}

impl ReadingRecord {
    fn into_row(self) -> Option<ReadingRow> {
        Some(ReadingRow {
            sensor: self.sensor?,
            observed_at: self.ts,
            ppm: self.ppm,
            ratio: self.ratio,
        })
    }
}

/// Most recent `limit` readings, newest first.
pub async fn fetch_recent_readings(pool: &PgPool, limit: usize) -> Result<Vec<ReadingRow>> {
    let limit = i64::try_from(limit).context("bootstrap limit out of range")?;

    let records: Vec<ReadingRecord> = sqlx::query_as(
        r#"
        SELECT sensor, ts, ppm::FLOAT8 AS ppm, ratio::FLOAT8 AS ratio
        FROM readings
        ORDER BY ts DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to execute recent readings query")?;

    Ok(records.into_iter().filter_map(ReadingRecord::into_row).collect())
}

pub async fn listen_readings(pool: &PgPool, channel: &str) -> Result<PgListener> {
    let mut listener = PgListener::connect_with(pool)
        .await
        .context("failed to connect listener")?;

    listener
        .listen(channel)
        .await
        .with_context(|| format!("failed to listen on channel: {channel}"))?;

    Ok(listener)
}
