//! Common types shared across the crate.
//!
//! This module contains the primitives everything else is built from:
//! - Configuration constants and [`IndexConfig`]
//! - Error types
//! - The record model ([`Timestamp`], [`SensorId`], [`SensorRecord`])

pub mod config;
pub mod error;
mod record;
mod sensor_id;
mod timestamp;

pub use config::IndexConfig;
pub use error::{Error, Result};
pub use record::{parse_measurement, SensorRecord};
pub use sensor_id::SensorId;
pub use timestamp::Timestamp;
