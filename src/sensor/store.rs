use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::sensor::Reading;

#[derive(Debug, Default)]
pub struct Store {
    readings: HashMap<String, Reading>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(
        &mut self,
        id: &str,
        ppm: Option<f64>,
        ratio: Option<f64>,
        observed_at: Option<DateTime<Utc>>,
    ) {
        let reading = Reading::new(ppm, ratio, observed_at);
        match self.readings.get_mut(id) {
            Some(slot) => *slot = reading,
            None => {
                self.readings.insert(id.to_owned(), reading);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Reading> {
        self.readings.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.readings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
