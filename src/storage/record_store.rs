//! The persistence bridge between [`SensorDb`](crate::SensorDb) and a
//! backing store.

use crate::common::{Result, SensorRecord, Timestamp};

/// Somewhere readings are kept across restarts.
///
/// The in-memory indexes are the source of truth while running. A store
/// only has to replay its contents at startup and mirror each insert and
/// range deletion afterwards.
pub trait RecordStore {
    /// Every stored reading, in no particular order.
    fn load_all(&mut self) -> Result<Vec<SensorRecord>>;

    /// Persist one newly inserted reading.
    fn append(&mut self, record: &SensorRecord) -> Result<()>;

    /// Remove readings with `start <= timestamp <= end`. Returns how many.
    fn delete_range(&mut self, start: &Timestamp, end: &Timestamp) -> Result<usize>;
}

/// A [`RecordStore`] backed by a `Vec`. Useful for tests and for seeding
/// a database from readings already in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<SensorRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<SensorRecord>) -> Self {
        Self { records }
    }

    /// Stored readings in append order.
    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&mut self) -> Result<Vec<SensorRecord>> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: &SensorRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn delete_range(&mut self, start: &Timestamp, end: &Timestamp) -> Result<usize> {
        let before = self.records.len();
        self.records
            .retain(|r| r.timestamp < *start || r.timestamp > *end);
        Ok(before - self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store
            .append(&SensorRecord::new("2024-01-01 00:00:00", 1, 1.0, "A", "Temp"))
            .unwrap();
        store
            .append(&SensorRecord::new("2024-01-01 00:05:00", 2, 2.0, "B", "Temp"))
            .unwrap();
        store
            .append(&SensorRecord::new("2024-01-01 00:10:00", 1, 3.0, "A", "Temp"))
            .unwrap();
        assert_eq!(store.load_all().unwrap().len(), 3);

        let removed = store
            .delete_range(
                &Timestamp::from("2024-01-01 00:05:00"),
                &Timestamp::from("2024-01-01 00:10:00"),
            )
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].value, 1.0);
    }
}
