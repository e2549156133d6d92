//! sensor-index - An in-memory B+ tree index over time-stamped sensor readings.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SensorDb / SharedSensorDb                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Aggregation (index/aggregate)               │   │
//! │  │     total / average / min / max, hourly + daily buckets  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↑                                  │
//! │  ┌──────────────────────────┐   ┌───────────────────────────┐  │
//! │  │  Primary tree (btree/)   │   │  Secondary index          │  │
//! │  │  Timestamp → Record      │   │  SensorId → BPlusTree     │  │
//! │  │  leaf chain for scans    │   │  pruned when emptied      │  │
//! │  └──────────────────────────┘   └───────────────────────────┘  │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │   RecordStore: MemoryStore | PagedStore (DiskManager)    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (Timestamp, SensorId, SensorRecord, Error, config)
//! - [`index`] - The B+ tree, the per-sensor index and aggregation
//! - [`storage`] - Record stores and the page file they use
//!
//! # Quick Start
//! ```no_run
//! use sensor_index::{IndexConfig, PagedStore, SensorDb, SensorId, Timestamp};
//!
//! // Rebuild the indexes from a store file and keep mirroring into it
//! let store = PagedStore::open_or_create("readings.db").unwrap();
//! let mut db = SensorDb::open(IndexConfig::default(), store).unwrap();
//!
//! db.insert_parsed("2024-01-01 00:00:00", "10001", "25.0", "Field_1", "Temp").unwrap();
//!
//! let summary = db.range_query_with_aggregation(
//!     &Timestamp::from("2024-01-01 00:00:00"),
//!     &Timestamp::from("2024-01-01 23:59:59"),
//! );
//! println!("average {}", summary.aggregation.average);
//!
//! let readings = db.query_by_id(SensorId(10001));
//! ```

pub mod common;
pub mod db;
pub mod index;
pub mod shared;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_ORDER, PAGE_SIZE};
pub use common::{Error, IndexConfig, Result, SensorId, SensorRecord, Timestamp};

pub use db::SensorDb;
pub use index::{
    Aggregation, BPlusTree, BucketAverage, Granularity, RangeSummary, SecondaryIndex,
};
pub use shared::SharedSensorDb;
pub use storage::{MemoryStore, PagedStore, RecordStore};
