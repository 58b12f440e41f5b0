mod card;
mod format;
mod log_feed;
mod render;

pub use card::*;
pub use format::*;
pub use log_feed::*;

use indexmap::IndexMap;

use crate::sensor::{AlertLevel, Registry, Staleness};

#[derive(Debug)]
pub struct Dashboard {
    cards: IndexMap<String, Card>,
    connected: bool,
    feed: LogFeed,
}

impl Dashboard {
    pub fn new(registry: &Registry, log_capacity: Option<usize>) -> Self {
        let cards = registry
            .iter()
            .map(|s| (s.id.clone(), Card::scaffold(s)))
            .collect();

        Self {
            cards,
            connected: false,
            feed: LogFeed::new(log_capacity),
        }
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    pub fn show_value(&mut self, id: &str, ppm: Option<f64>, alert: AlertLevel) -> bool {
        let Some(card) = self.cards.get_mut(id) else {
            return false;
        };

        let value = format_ppm(ppm);
        let changed = card.value != value || card.alert != alert;
        card.value = value;
        card.alert = alert;
        changed
    }

    pub fn show_staleness(&mut self, id: &str, staleness: Staleness, last_seen: String) -> bool {
        let Some(card) = self.cards.get_mut(id) else {
            return false;
        };

        let presence = if staleness.offline {
            Presence::Offline
        } else {
            Presence::Online
        };
        let age = format_age(staleness.age_secs);

        let changed = card.presence != presence || card.last_seen != last_seen || card.age != age;
        card.presence = presence;
        card.last_seen = last_seen;
        card.age = age;
        changed
    }

    pub fn set_connected(&mut self, connected: bool) -> bool {
        let changed = self.connected != connected;
        self.connected = connected;
        changed
    }

    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.feed.prepend(message);
    }
}
