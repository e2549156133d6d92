//! Per-sensor secondary index.

use std::collections::BTreeMap;

use crate::common::{SensorId, SensorRecord, Timestamp};
use crate::index::btree::BPlusTree;

/// A timestamp-ordered tree of one sensor's readings.
pub type SensorTree = BPlusTree<Timestamp, SensorRecord>;

/// Maps each sensor to its own [`BPlusTree`] of readings.
///
/// A sensor's tree is created on its first insert and dropped as soon as a
/// range deletion leaves it empty, so every sensor present here has at
/// least one reading. Each tree holds its own copy of the record; nothing
/// is shared with the primary tree.
#[derive(Debug)]
pub struct SecondaryIndex {
    /// Order given to every new sensor tree.
    order: usize,

    by_sensor: BTreeMap<SensorId, SensorTree>,
}

impl SecondaryIndex {
    pub fn new(order: usize) -> Self {
        Self {
            order,
            by_sensor: BTreeMap::new(),
        }
    }

    /// Add a reading to its sensor's tree, creating the tree if needed.
    pub fn insert(&mut self, record: SensorRecord) {
        let order = self.order;
        let tree = self.by_sensor.entry(record.sensor_id).or_insert_with(|| {
            log::debug!("new secondary tree for sensor {}", record.sensor_id);
            BPlusTree::new(order)
        });
        tree.insert(record.timestamp.clone(), record);
    }

    /// Remove readings with `start <= timestamp <= end` from every sensor,
    /// then drop sensors left with no readings.
    ///
    /// Returns the number of readings removed.
    pub fn delete_range(&mut self, start: &Timestamp, end: &Timestamp) -> usize {
        let removed: usize = self
            .by_sensor
            .values_mut()
            .map(|tree| tree.delete_range(start, end))
            .sum();

        self.by_sensor.retain(|sensor_id, tree| {
            if tree.is_empty() {
                log::debug!("sensor {sensor_id} has no readings left, dropping its tree");
            }
            !tree.is_empty()
        });

        removed
    }

    /// All readings of `sensor_id` in timestamp order.
    ///
    /// Empty if the sensor is unknown.
    pub fn query_by_id(&self, sensor_id: SensorId) -> Vec<&SensorRecord> {
        self.by_sensor
            .get(&sensor_id)
            .map(|tree| tree.iter().map(|entry| &entry.value).collect())
            .unwrap_or_default()
    }

    /// The tree of `sensor_id`, if it has any readings.
    pub fn tree(&self, sensor_id: SensorId) -> Option<&SensorTree> {
        self.by_sensor.get(&sensor_id)
    }

    pub fn contains(&self, sensor_id: SensorId) -> bool {
        self.by_sensor.contains_key(&sensor_id)
    }

    /// Known sensors, ascending.
    pub fn sensor_ids(&self) -> impl Iterator<Item = SensorId> + '_ {
        self.by_sensor.keys().copied()
    }

    pub fn sensor_count(&self) -> usize {
        self.by_sensor.len()
    }

    /// Total readings across all sensors.
    pub fn len(&self) -> usize {
        self.by_sensor.values().map(BPlusTree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sensor.is_empty()
    }
}
