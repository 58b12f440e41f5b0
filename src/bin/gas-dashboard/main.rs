mod args;

use std::io::Write as _;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};
use args::Args;
use chrono::TimeDelta;
use clap::Parser as _;
use gas_dashboard::{
    app::{App, AppOptions, Event},
    dashboard::TimeFormatter,
    db::{fetch_recent_readings, install_notify_trigger, migrate, new_pool},
    monitor::{TICK_PERIOD, run_ticker},
    realtime::{Backoff, PgSubscriber, SubscriptionOptions, run_subscription},
    sensor::Registry,
};
use log::{error, info};
use tokio::sync::mpsc;

const EVENT_QUEUE_SIZE: usize = 256;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let registry = Registry::new(args.sensors).context("invalid sensor configuration")?;

    let pool = new_pool(&args.database_url)
        .await
        .context("failed to connect to database")?;

    if args.migrate {
        migrate(&pool).await?;
        install_notify_trigger(&pool, &args.channel).await?;
    }

    let mut app = App::new(
        registry,
        AppOptions {
            offline_after: TimeDelta::seconds(args.offline_after_sec.into()),
            bootstrap_limit: args.bootstrap_limit,
            formatter: TimeFormatter::new(args.timezone, args.time_format),
            log_capacity: args.log_capacity,
        },
    );
    paint(&app, args.plain)?;

    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_SIZE);

    tokio::spawn({
        let pool = pool.clone();
        let tx = tx.clone();
        let limit = args.bootstrap_limit;
        async move {
            let snapshot = fetch_recent_readings(&pool, limit).await;
            let _ = tx.send(Event::Snapshot(snapshot)).await;
        }
    });

    tokio::spawn(run_subscription(
        PgSubscriber {
            pool: pool.clone(),
            channel: args.channel,
        },
        SubscriptionOptions {
            subscribe_timeout: Duration::from_secs(args.subscribe_timeout_sec),
            backoff: Backoff {
                initial: Duration::from_secs(args.reconnect_initial_sec),
                max: Duration::from_secs(args.reconnect_max_sec),
            },
        },
        tx.clone(),
    ));

    tokio::spawn(run_ticker(TICK_PERIOD, tx));

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                if app.handle(event) {
                    paint(&app, args.plain)?;
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl+C")?;
                info!("shutting down");
                break;
            }
        }
    }

    drop(rx);
    pool.close().await;

    Ok(())
}

fn paint(app: &App, plain: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if !plain {
        stdout.write_all(CLEAR_SCREEN.as_bytes())?;
    }
    write!(stdout, "{}", app.dashboard())?;
    stdout.flush().context("failed to write dashboard")
}
