use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const PLACEHOLDER: &str = "—";

pub const DEFAULT_TIME_FORMAT: &str = "%d/%m/%y %H:%M:%S";

#[derive(Debug, Clone)]
pub struct TimeFormatter {
    timezone: Tz,
    pattern: String,
}

impl TimeFormatter {
    pub fn new(timezone: Tz, pattern: impl Into<String>) -> Self {
        Self {
            timezone,
            pattern: pattern.into(),
        }
    }

    /// Falls back to RFC 3339 in UTC when the pattern cannot be rendered.
    pub fn format(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.timezone);

        let mut out = String::new();
        if write!(out, "{}", local.format(&self.pattern)).is_err() {
            return at.to_rfc3339();
        }

        out
    }

    pub fn format_opt(&self, at: Option<DateTime<Utc>>) -> String {
        at.map(|at| self.format(at))
            .unwrap_or_else(|| PLACEHOLDER.to_owned())
    }
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::new(chrono_tz::America::Bogota, DEFAULT_TIME_FORMAT)
    }
}

pub fn format_ppm(ppm: Option<f64>) -> String {
    match ppm {
        Some(ppm) if ppm.is_finite() => format!("{ppm:.1}"),
        _ => PLACEHOLDER.to_owned(),
    }
}

pub fn format_age(age_secs: Option<i64>) -> String {
    match age_secs {
        Some(secs) => format!("{secs} s"),
        None => PLACEHOLDER.to_owned(),
    }
}
