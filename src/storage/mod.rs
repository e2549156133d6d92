//! Storage layer - persistence for sensor readings.
//!
//! - [`RecordStore`] - What the database mirrors inserts and deletions into
//! - [`MemoryStore`] - A `Vec`-backed store
//! - [`PagedStore`] - Readings in a file of checksummed 4KB pages
//! - [`DiskManager`] - Low-level page file I/O
//! - [`page`] - Page types and layouts

mod disk_manager;
pub mod page;
mod paged_store;
mod record_store;

pub use disk_manager::DiskManager;
pub use paged_store::PagedStore;
pub use record_store::{MemoryStore, RecordStore};
