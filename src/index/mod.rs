//! Index structures.
//!
//! - [`btree`] - The ordered B+ tree every index is built from
//! - [`SecondaryIndex`] - One tree per sensor, kept in step with the primary
//! - [`aggregate`] - Summaries over range-query results

pub mod aggregate;
pub mod btree;
mod secondary;

pub use aggregate::{Aggregation, BucketAverage, Granularity, RangeSummary};
pub use btree::BPlusTree;
pub use secondary::SecondaryIndex;
