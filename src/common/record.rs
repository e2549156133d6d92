//! Sensor reading record.

use crate::common::{Error, Result, SensorId, Timestamp};

/// One time-stamped sensor reading.
///
/// This is the value stored in every tree. The primary tree and the
/// sensor's secondary tree each hold their own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    pub timestamp: Timestamp,
    pub sensor_id: SensorId,
    /// The measured value.
    pub value: f64,
    pub location: String,
    /// Kind of measurement, e.g. `Temp` or `Humidity`.
    pub data_type: String,
}

impl SensorRecord {
    /// Build a record from already-typed fields.
    pub fn new(
        timestamp: impl Into<Timestamp>,
        sensor_id: impl Into<SensorId>,
        value: f64,
        location: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            sensor_id: sensor_id.into(),
            value,
            location: location.into(),
            data_type: data_type.into(),
        }
    }

    /// Build a record from raw text fields, as typed by a user.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` naming the first field that fails to
    /// convert. Nothing is inserted anywhere on failure.
    ///
    /// # Example
    /// ```
    /// use sensor_index::SensorRecord;
    ///
    /// let record = SensorRecord::parse("2024-01-01 00:00:00", "10001", "25.5", "Field_1", "Temp").unwrap();
    /// assert_eq!(record.value, 25.5);
    ///
    /// let err = SensorRecord::parse("2024-01-01 00:00:00", "10001", "warm", "Field_1", "Temp").unwrap_err();
    /// assert!(err.is_invalid_input());
    /// ```
    pub fn parse(
        timestamp: &str,
        sensor_id: &str,
        value: &str,
        location: &str,
        data_type: &str,
    ) -> Result<Self> {
        Ok(Self {
            timestamp: Timestamp::parse(timestamp)?,
            sensor_id: SensorId::parse(sensor_id)?,
            value: parse_measurement(value)?,
            location: location.to_string(),
            data_type: data_type.to_string(),
        })
    }
}

/// Convert caller-supplied text into a measurement value.
///
/// `NaN` and infinities are rejected.
///
/// # Errors
/// Returns `Error::InvalidInput` if `s` is not a finite number.
pub fn parse_measurement(s: &str) -> Result<f64> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|e| Error::invalid_input("measurement value", s, e))?;

    if !value.is_finite() {
        return Err(Error::invalid_input(
            "measurement value",
            s,
            "value must be finite",
        ));
    }
    Ok(value)
}
