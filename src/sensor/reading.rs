use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRow {
    pub sensor: String,

    pub observed_at: Option<DateTime<Utc>>,

    pub ppm: Option<f64>,

    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    pub ppm: Option<f64>,

    pub ratio: Option<f64>,

    pub observed_at: Option<DateTime<Utc>>,
}

impl Reading {
    pub fn new(ppm: Option<f64>, ratio: Option<f64>, observed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            ppm: finite(ppm),
            ratio: finite(ratio),
            observed_at,
        }
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}
