//! SensorDb - the engine facade.
//!
//! [`SensorDb`] keeps the primary tree and the [`SecondaryIndex`] in
//! lockstep and mirrors every change into an optional [`RecordStore`].

use std::time::Instant;

use crate::common::{IndexConfig, Result, SensorId, SensorRecord, Timestamp};
use crate::index::aggregate::bucket_averages;
use crate::index::{BPlusTree, BucketAverage, Granularity, RangeSummary, SecondaryIndex};
use crate::storage::RecordStore;

/// Boxed mirror store owned by a [`SensorDb`].
pub type BoxedStore = Box<dyn RecordStore + Send + Sync>;

/// In-memory index of sensor readings.
///
/// # Architecture
/// ```text
/// ┌────────────────────────────────────────────────────────────┐
/// │                         SensorDb                           │
/// │  ┌────────────────────────┐  ┌──────────────────────────┐  │
/// │  │ primary                │  │ secondary                │  │
/// │  │ BPlusTree<Timestamp,   │  │ SensorId → BPlusTree     │  │
/// │  │           SensorRecord>│  │ (one tree per sensor)    │  │
/// │  └────────────────────────┘  └──────────────────────────┘  │
/// │               │ insert / delete_range mirrored to          │
/// │               ▼                                            │
/// │  ┌──────────────────────────────────────────────────────┐  │
/// │  │ store: Option<Box<dyn RecordStore>>                  │  │
/// │  └──────────────────────────────────────────────────────┘  │
/// └────────────────────────────────────────────────────────────┘
/// ```
///
/// # Mirroring
/// Writes update memory first. If the store then fails, the error is
/// returned but the in-memory change stands; the store is behind until
/// it is reloaded.
///
/// # Usage
/// ```
/// use sensor_index::{IndexConfig, SensorDb, SensorRecord, Timestamp};
///
/// let mut db = SensorDb::new(IndexConfig::default());
/// db.insert(SensorRecord::new("2024-01-01 00:00:00", 10001, 25.0, "Field_1", "Temp")).unwrap();
///
/// let found = db.search(&Timestamp::from("2024-01-01 00:00:00")).unwrap();
/// assert_eq!(found.value, 25.0);
/// ```
pub struct SensorDb {
    config: IndexConfig,

    /// Every reading, keyed by timestamp.
    primary: BPlusTree<Timestamp, SensorRecord>,

    /// The same readings, split per sensor.
    secondary: SecondaryIndex,

    /// Mirror for inserts and deletions, if persistent.
    store: Option<BoxedStore>,
}

impl SensorDb {
    /// Create an empty database with no backing store.
    ///
    /// # Panics
    /// Panics if `config.order` is below 3.
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            primary: BPlusTree::new(config.order),
            secondary: SecondaryIndex::new(config.order),
            store: None,
        }
    }

    /// Rebuild the indexes from `store` and keep mirroring into it.
    ///
    /// Loaded readings go straight into the trees; nothing is written back.
    ///
    /// # Errors
    /// Returns whatever `store.load_all()` fails with.
    pub fn open<S>(config: IndexConfig, mut store: S) -> Result<Self>
    where
        S: RecordStore + Send + Sync + 'static,
    {
        let started = Instant::now();
        let records = store.load_all()?;

        let mut db = Self::new(config);
        let count = records.len();
        for record in records {
            db.index(record);
        }
        db.store = Some(Box::new(store));

        log::info!(
            "loaded {} readings from {} sensors in {:?}",
            count,
            db.secondary.sensor_count(),
            started.elapsed()
        );
        Ok(db)
    }

    /// Give up the backing store, if any.
    pub fn close(self) -> Option<BoxedStore> {
        self.store
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert a reading into both indexes, then mirror it.
    ///
    /// # Errors
    /// Only a mirror failure. The reading is indexed either way.
    pub fn insert(&mut self, record: SensorRecord) -> Result<()> {
        self.index(record.clone());

        if let Some(store) = self.store.as_mut() {
            store.append(&record).map_err(|e| {
                log::warn!("failed to mirror reading at {}: {e}", record.timestamp);
                e
            })?;
        }
        Ok(())
    }

    /// Parse raw text fields and insert the resulting reading.
    ///
    /// # Errors
    /// - `Error::InvalidInput` naming the bad field; nothing is inserted
    /// - Any mirror failure, as for [`insert`](Self::insert)
    pub fn insert_parsed(
        &mut self,
        timestamp: &str,
        sensor_id: &str,
        value: &str,
        location: &str,
        data_type: &str,
    ) -> Result<()> {
        let record = SensorRecord::parse(timestamp, sensor_id, value, location, data_type)?;
        self.insert(record)
    }

    /// Remove readings with `start <= timestamp <= end` from both indexes,
    /// then from the store.
    ///
    /// Returns how many readings left the primary tree.
    ///
    /// # Errors
    /// Only a mirror failure. The in-memory deletion stands.
    pub fn delete_range(&mut self, start: &Timestamp, end: &Timestamp) -> Result<usize> {
        let removed = self.primary.delete_range(start, end);
        let secondary_removed = self.secondary.delete_range(start, end);
        debug_assert_eq!(removed, secondary_removed);
        log::debug!("deleted {removed} readings in [{start}, {end}]");

        if let Some(store) = self.store.as_mut() {
            match store.delete_range(start, end) {
                Ok(mirrored) if mirrored != removed => {
                    log::warn!("store removed {mirrored} readings, index removed {removed}");
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("failed to mirror deletion of [{start}, {end}]: {e}");
                    return Err(e);
                }
            }
        }
        Ok(removed)
    }

    fn index(&mut self, record: SensorRecord) {
        self.primary.insert(record.timestamp.clone(), record.clone());
        self.secondary.insert(record);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The most recently inserted reading at exactly `timestamp`.
    pub fn search(&self, timestamp: &Timestamp) -> Option<&SensorRecord> {
        self.primary.search(timestamp)
    }

    /// Readings with `start <= timestamp <= end`, oldest first.
    pub fn range_query(&self, start: &Timestamp, end: &Timestamp) -> Vec<&SensorRecord> {
        self.primary
            .range_query(start, end)
            .into_iter()
            .map(|entry| &entry.value)
            .collect()
    }

    /// [`range_query`](Self::range_query) plus total, average and extremes.
    pub fn range_query_with_aggregation(
        &self,
        start: &Timestamp,
        end: &Timestamp,
    ) -> RangeSummary<'_> {
        RangeSummary::new(self.range_query(start, end))
    }

    /// Every reading of `sensor_id`, oldest first. Empty if unknown.
    pub fn query_by_id(&self, sensor_id: SensorId) -> Vec<&SensorRecord> {
        self.secondary.query_by_id(sensor_id)
    }

    /// Sensors with at least one reading, ascending.
    pub fn sensor_ids(&self) -> Vec<SensorId> {
        self.secondary.sensor_ids().collect()
    }

    /// The first `limit` readings in timestamp order.
    pub fn head(&self, limit: usize) -> Vec<&SensorRecord> {
        self.primary.iter().take(limit).map(|entry| &entry.value).collect()
    }

    pub fn hourly_averages(&self, start: &Timestamp, end: &Timestamp) -> Vec<BucketAverage> {
        bucket_averages(self.range_query(start, end), Granularity::Hour)
    }

    pub fn daily_averages(&self, start: &Timestamp, end: &Timestamp) -> Vec<BucketAverage> {
        bucket_averages(self.range_query(start, end), Granularity::Day)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    pub fn config(&self) -> IndexConfig {
        self.config
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn primary(&self) -> &BPlusTree<Timestamp, SensorRecord> {
        &self.primary
    }

    pub fn secondary(&self) -> &SecondaryIndex {
        &self.secondary
    }
}

impl Default for SensorDb {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::common::Error;
    use crate::storage::MemoryStore;

    fn ts(s: &str) -> Timestamp {
        Timestamp::from(s)
    }

    fn reading(time: &str, sensor: u32, value: f64) -> SensorRecord {
        SensorRecord::new(time, sensor, value, "Field_1", "Temp")
    }

    /// Store that accepts nothing.
    struct FailingStore;

    impl RecordStore for FailingStore {
        fn load_all(&mut self) -> Result<Vec<SensorRecord>> {
            Ok(Vec::new())
        }

        fn append(&mut self, _record: &SensorRecord) -> Result<()> {
            Err(Error::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
        }

        fn delete_range(&mut self, _start: &Timestamp, _end: &Timestamp) -> Result<usize> {
            Err(Error::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
        }
    }

    #[test]
    fn test_new_is_empty() {
        let db = SensorDb::default();
        assert!(db.is_empty());
        assert!(!db.has_store());
        assert_eq!(db.config().order, 20);
        assert!(db.search(&ts("2024-01-01 00:00:00")).is_none());
        assert!(db.head(20).is_empty());
    }

    #[test]
    fn test_insert_updates_both_indexes() {
        let mut db = SensorDb::new(IndexConfig::new().with_order(4));
        for (i, sensor) in [1, 2, 1, 3, 1].into_iter().enumerate() {
            db.insert(reading(&format!("2024-01-01 00:0{i}:00"), sensor, i as f64))
                .unwrap();
        }

        assert_eq!(db.len(), 5);
        assert_eq!(db.secondary().len(), 5);
        assert_eq!(db.sensor_ids(), vec![SensorId(1), SensorId(2), SensorId(3)]);
        assert_eq!(db.query_by_id(SensorId(1)).len(), 3);
        db.primary().validate();
    }

    #[test]
    fn test_insert_parsed_rejects_bad_input() {
        let mut db = SensorDb::default();
        let err = db
            .insert_parsed("2024-01-01 00:00:00", "abc", "1.0", "Field_1", "Temp")
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(db.is_empty());

        db.insert_parsed("2024-01-01 00:00:00", "7", "1.5", "Field_1", "Temp")
            .unwrap();
        assert_eq!(db.query_by_id(SensorId(7))[0].value, 1.5);
    }

    #[test]
    fn test_head_in_timestamp_order() {
        let mut db = SensorDb::new(IndexConfig::new().with_order(3));
        for minute in (0..30).rev() {
            db.insert(reading(&format!("2024-01-01 00:{minute:02}:00"), 1, f64::from(minute)))
                .unwrap();
        }

        let head = db.head(5);
        let values: Vec<f64> = head.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(db.head(100).len(), 30);
    }

    #[test]
    fn test_delete_range_prunes_sensors() {
        let mut db = SensorDb::new(IndexConfig::new().with_order(4));
        db.insert(reading("2024-01-01 00:00:00", 1, 1.0)).unwrap();
        db.insert(reading("2024-01-01 00:05:00", 2, 2.0)).unwrap();
        db.insert(reading("2024-01-01 00:10:00", 1, 3.0)).unwrap();

        let removed = db
            .delete_range(&ts("2024-01-01 00:05:00"), &ts("2024-01-01 00:05:00"))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.sensor_ids(), vec![SensorId(1)]);
        assert!(db.query_by_id(SensorId(2)).is_empty());
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_open_loads_without_mirroring() {
        let store = MemoryStore::from_records(vec![
            reading("2024-01-01 00:10:00", 2, 3.0),
            reading("2024-01-01 00:00:00", 1, 1.0),
        ]);
        let db = SensorDb::open(IndexConfig::default(), store).unwrap();

        assert!(db.has_store());
        assert_eq!(db.len(), 2);
        assert_eq!(db.head(1)[0].value, 1.0);

        let mut store = db.close().unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_mirror_failure_keeps_memory_change() {
        let mut db = SensorDb::open(IndexConfig::default(), FailingStore).unwrap();

        assert!(db.insert(reading("2024-01-01 00:00:00", 1, 1.0)).is_err());
        assert_eq!(db.len(), 1);
        assert_eq!(db.query_by_id(SensorId(1)).len(), 1);

        assert!(db
            .delete_range(&ts("2024-01-01 00:00:00"), &ts("2024-01-01 23:59:59"))
            .is_err());
        assert!(db.is_empty());
        assert!(db.sensor_ids().is_empty());
    }

    #[test]
    fn test_bucket_averages_over_range() {
        let mut db = SensorDb::default();
        db.insert(reading("2024-01-01 00:10:00", 1, 10.0)).unwrap();
        db.insert(reading("2024-01-01 00:20:00", 2, 20.0)).unwrap();
        db.insert(reading("2024-01-01 05:00:00", 1, 60.0)).unwrap();
        db.insert(reading("2024-01-02 00:00:00", 1, 99.0)).unwrap();

        let hourly = db.hourly_averages(&ts("2024-01-01 00:00:00"), &ts("2024-01-01 23:59:59"));
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].average, 15.0);
        assert_eq!(hourly[1].bucket, "2024-01-01 05:00:00");

        let daily = db.daily_averages(&ts("2024-01-01 00:00:00"), &ts("2024-01-02 23:59:59"));
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].average, 30.0);
        assert_eq!(daily[1].average, 99.0);
    }
}
