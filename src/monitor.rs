use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc::Sender;
use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::IntervalStream;

use crate::app::Event;
use crate::sensor::{Registry, SensorConfig, Staleness, Store};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub fn sweep<'a>(
    registry: &'a Registry,
    store: &'a Store,
    now: DateTime<Utc>,
    offline_after: TimeDelta,
) -> impl Iterator<Item = (&'a SensorConfig, Staleness)> + 'a {
    registry.iter().map(move |sensor| {
        let observed_at = store.get(&sensor.id).and_then(|r| r.observed_at);
        (sensor, Staleness::evaluate(observed_at, now, offline_after))
    })
}

pub async fn run_ticker(period: Duration, tx: Sender<Event>) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks = IntervalStream::new(ticker).map(|_| Event::Tick(Utc::now()));
    while let Some(tick) = ticks.next().await {
        if tx.send(tick).await.is_err() {
            break;
        }
    }
}
