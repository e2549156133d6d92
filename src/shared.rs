//! Thread-safe handle to a [`SensorDb`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::db::SensorDb;

/// A [`SensorDb`] behind a reader-writer lock.
///
/// Cloning is cheap and every clone sees the same database. Queries take
/// the lock shared; inserts and deletions take it exclusively, so both
/// indexes change together.
///
/// # Usage
/// ```
/// use sensor_index::{SensorDb, SensorRecord, SharedSensorDb};
///
/// let db = SharedSensorDb::new(SensorDb::default());
/// db.write(|db| db.insert(SensorRecord::new("2024-01-01 00:00:00", 1, 2.0, "A", "Temp")))
///     .unwrap();
/// assert_eq!(db.read(|db| db.len()), 1);
/// ```
#[derive(Clone)]
pub struct SharedSensorDb {
    inner: Arc<RwLock<SensorDb>>,
}

impl SharedSensorDb {
    pub fn new(db: SensorDb) -> Self {
        Self {
            inner: Arc::new(RwLock::new(db)),
        }
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&SensorDb) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut SensorDb) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl From<SensorDb> for SharedSensorDb {
    fn from(db: SensorDb) -> Self {
        Self::new(db)
    }
}
