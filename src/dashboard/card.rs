use crate::sensor::{AlertLevel, SensorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// No staleness pass has run yet.
    Pending,
    Online,
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Pending => "—",
            Presence::Online => "ONLINE",
            Presence::Offline => "OFFLINE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub label: String,
    pub threshold_ppm: f64,

    pub value: String,
    pub alert: AlertLevel,
    pub presence: Presence,
    pub last_seen: String,
    pub age: String,
}

impl Card {
    pub fn scaffold(sensor: &SensorConfig) -> Self {
        Self {
            id: sensor.id.clone(),
            label: sensor.label.clone(),
            threshold_ppm: sensor.threshold_ppm,
            value: super::PLACEHOLDER.to_owned(),
            alert: AlertLevel::Warn,
            presence: Presence::Pending,
            last_seen: super::PLACEHOLDER.to_owned(),
            age: super::PLACEHOLDER.to_owned(),
        }
    }
}
