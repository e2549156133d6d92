//! Sensor identifier type.

use std::fmt;

use crate::common::{Error, Result};

/// Identifies the sensor a reading came from.
///
/// # Example
/// ```
/// use sensor_index::SensorId;
///
/// let id = SensorId::parse("10001").unwrap();
/// assert_eq!(id, SensorId::new(10001));
/// assert!(SensorId::parse("ten").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorId(pub u32);

impl SensorId {
    /// Create a new SensorId.
    #[inline]
    pub fn new(id: u32) -> Self {
        SensorId(id)
    }

    /// Parse a caller-supplied identifier.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if `s` is not an unsigned integer.
    pub fn parse(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .map(SensorId)
            .map_err(|e| Error::invalid_input("sensor id", s, e))
    }
}

impl From<u32> for SensorId {
    fn from(id: u32) -> Self {
        SensorId(id)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_id_parse() {
        assert_eq!(SensorId::parse(" 10002 ").unwrap(), SensorId::new(10002));
        assert!(SensorId::parse("-1").is_err());
        assert!(SensorId::parse("").is_err());
    }

    #[test]
    fn test_sensor_id_ordering() {
        assert!(SensorId::new(1) < SensorId::new(2));
    }

    #[test]
    fn test_sensor_id_display() {
        assert_eq!(format!("{}", SensorId::new(42)), "42");
    }
}
