use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::sensor::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Ok,
    Warn,
    Err,
}

impl AlertLevel {
    pub fn classify(ppm: Option<f64>, threshold_ppm: f64) -> Self {
        match ppm {
            None => AlertLevel::Warn,
            Some(ppm) if ppm.is_nan() => AlertLevel::Warn,
            Some(ppm) if ppm >= threshold_ppm => AlertLevel::Err,
            Some(_) => AlertLevel::Ok,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Ok => "ok",
            AlertLevel::Warn => "warn",
            AlertLevel::Err => "err",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Staleness {
    pub offline: bool,

    /// Whole seconds since the observation, `None` when never observed.
    pub age_secs: Option<i64>,
}

impl Staleness {
    pub fn evaluate(
        observed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        offline_after: TimeDelta,
    ) -> Self {
        let Some(observed_at) = observed_at else {
            return Self {
                offline: true,
                age_secs: None,
            };
        };

        let age = now - observed_at;
        Self {
            offline: age > offline_after,
            age_secs: Some(round_secs(age)),
        }
    }
}

fn round_secs(age: TimeDelta) -> i64 {
    (age.num_milliseconds() as f64 / 1000.0).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStatus {
    pub staleness: Staleness,

    pub alert: AlertLevel,
}

impl DerivedStatus {
    pub fn derive(
        reading: Option<&Reading>,
        threshold_ppm: f64,
        now: DateTime<Utc>,
        offline_after: TimeDelta,
    ) -> Self {
        let reading = reading.copied().unwrap_or_default();
        Self {
            staleness: Staleness::evaluate(reading.observed_at, now, offline_after),
            alert: AlertLevel::classify(reading.ppm, threshold_ppm),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.staleness.offline
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn alert_level_follows_threshold() {
        assert_eq!(AlertLevel::classify(Some(200.0), 150.0), AlertLevel::Err);
        assert_eq!(AlertLevel::classify(Some(150.0), 150.0), AlertLevel::Err);
        assert_eq!(AlertLevel::classify(Some(50.0), 150.0), AlertLevel::Ok);
        assert_eq!(AlertLevel::classify(None, 150.0), AlertLevel::Warn);
        assert_eq!(AlertLevel::classify(Some(f64::NAN), 150.0), AlertLevel::Warn);
    }

    #[test]
    fn never_observed_is_offline_with_unknown_age() {
        let s = Staleness::evaluate(None, now(), TimeDelta::seconds(90));
        assert!(s.offline);
        assert_eq!(s.age_secs, None);
    }

    #[test]
    fn offline_only_after_window_is_exceeded() {
        let window = TimeDelta::seconds(90);

        let s = Staleness::evaluate(Some(now() - TimeDelta::seconds(90)), now(), window);
        assert!(!s.offline);
        assert_eq!(s.age_secs, Some(90));

        let s = Staleness::evaluate(
            Some(now() - TimeDelta::milliseconds(90_400)),
            now(),
            window,
        );
        assert!(s.offline);
        assert_eq!(s.age_secs, Some(90));

        let s = Staleness::evaluate(Some(now() - TimeDelta::milliseconds(2_600)), now(), window);
        assert!(!s.offline);
        assert_eq!(s.age_secs, Some(3));
    }

    #[test]
    fn alert_and_presence_are_independent() {
        let window = TimeDelta::seconds(90);

        let fresh_high = Reading::new(Some(500.0), None, Some(now()));
        let status = DerivedStatus::derive(Some(&fresh_high), 150.0, now(), window);
        assert!(!status.is_offline());
        assert_eq!(status.alert, AlertLevel::Err);

        let old_low = Reading::new(Some(1.0), None, Some(now() - TimeDelta::hours(1)));
        let status = DerivedStatus::derive(Some(&old_low), 150.0, now(), window);
        assert!(status.is_offline());
        assert_eq!(status.alert, AlertLevel::Ok);

        let status = DerivedStatus::derive(None, 150.0, now(), window);
        assert!(status.is_offline());
        assert_eq!(status.alert, AlertLevel::Warn);
    }
}
