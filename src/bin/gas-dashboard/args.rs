use chrono_tz::Tz;
use clap::Parser;
use gas_dashboard::dashboard::DEFAULT_TIME_FORMAT;
use gas_dashboard::db::parse_channel;
use gas_dashboard::sensor::SensorConfig;

#[derive(Debug, Parser)]
#[command(about = "Live dashboard for MQ-series gas sensor readings")]
pub struct Args {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "TZ", default_value = "America/Bogota")]
    pub timezone: Tz,

    /// Sensor as ID:THRESHOLD:LABEL, repeat for each card.
    #[arg(
        long = "sensor",
        env = "SENSORS",
        value_delimiter = ';',
        default_values = [
            "MQ-135:150:MQ-135 (Calidad aire)",
            "MQ-7:50:MQ-7 (CO)",
            "MQ-2:200:MQ-2 (LPG/Humo)",
        ]
    )]
    pub sensors: Vec<SensorConfig>,

    #[arg(long, env = "OFFLINE_AFTER_SEC", default_value_t = 90)]
    pub offline_after_sec: u32,

    #[arg(long, env = "BOOTSTRAP_LIMIT", default_value_t = 1000)]
    pub bootstrap_limit: usize,

    #[arg(
        long,
        env = "READINGS_CHANNEL",
        default_value = "readings_insert",
        value_parser = parse_channel
    )]
    pub channel: String,

    #[arg(long, default_value_t = 10)]
    pub subscribe_timeout_sec: u64,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub reconnect_initial_sec: u64,

    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub reconnect_max_sec: u64,

    #[arg(long, env = "TIME_FORMAT", default_value = DEFAULT_TIME_FORMAT)]
    pub time_format: String,

    /// Keep at most this many log entries.
    #[arg(long)]
    pub log_capacity: Option<usize>,

    /// Print without clearing the terminal between repaints.
    #[arg(long)]
    pub plain: bool,

    /// Create the readings table and point its insert trigger at --channel.
    #[arg(long)]
    pub migrate: bool,
}
