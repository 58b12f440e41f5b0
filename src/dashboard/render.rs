use std::fmt;

use crate::dashboard::Dashboard;

const RENDERED_LOG_ENTRIES: usize = 10;

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indicator = if self.is_connected() {
            "● live"
        } else {
            "○ disconnected"
        };
        writeln!(f, "Gas sensors  {indicator}")?;
        writeln!(f)?;

        let width = self.cards().map(|c| c.label.chars().count()).max().unwrap_or(0);
        for card in self.cards() {
            writeln!(
                f,
                "{:<width$}  [{:^7}] [{:^4}] {:>8} ppm  threshold {} ppm  last: {}  age: {}",
                card.label,
                card.presence.as_str(),
                card.alert.as_str(),
                card.value,
                card.threshold_ppm,
                card.last_seen,
                card.age,
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Log")?;
        for entry in self.feed().iter().take(RENDERED_LOG_ENTRIES) {
            writeln!(f, "  {entry}")?;
        }

        Ok(())
    }
}
