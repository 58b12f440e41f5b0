use std::fmt;
use std::str::FromStr;

use anyhow::{Context as _, Error, bail};

/// Parsed from `ID:THRESHOLD:LABEL`. The label is everything after the
/// second colon, so it may contain colons itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    pub id: String,

    pub label: String,

    pub threshold_ppm: f64,
}

impl SensorConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>, threshold_ppm: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            threshold_ppm,
        }
    }
}

impl FromStr for SensorConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let id = parts.next().unwrap_or_default().trim();
        if id.is_empty() {
            bail!("sensor id is empty: {s:?}");
        }

        let Some(threshold) = parts.next() else {
            bail!("sensor threshold missing: expected ID:THRESHOLD:LABEL, got {s:?}");
        };
        let threshold_ppm: f64 = threshold
            .trim()
            .parse()
            .with_context(|| format!("failed to parse sensor threshold: {threshold:?}"))?;
        if !threshold_ppm.is_finite() {
            bail!("sensor threshold must be finite: {threshold:?}");
        }

        let label = match parts.next().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => id,
        };

        Ok(Self::new(id, label, threshold_ppm))
    }
}

impl fmt::Display for SensorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.id, self.threshold_ppm, self.label)
    }
}
