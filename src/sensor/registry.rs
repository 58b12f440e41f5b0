use anyhow::{Result, bail};
use indexmap::IndexMap;

use crate::sensor::SensorConfig;

#[derive(Debug, Clone)]
pub struct Registry {
    sensors: IndexMap<String, SensorConfig>,
}

impl Registry {
    pub fn new(sensors: impl IntoIterator<Item = SensorConfig>) -> Result<Self> {
        let mut map = IndexMap::new();
        for sensor in sensors {
            if map.contains_key(&sensor.id) {
                bail!("duplicate sensor id: {}", sensor.id);
            }
            map.insert(sensor.id.clone(), sensor);
        }

        if map.is_empty() {
            bail!("no sensors configured");
        }

        Ok(Self { sensors: map })
    }

    pub fn get(&self, id: &str) -> Option<&SensorConfig> {
        self.sensors.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sensors.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorConfig> {
        self.sensors.values()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
