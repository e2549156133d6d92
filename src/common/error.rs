//! Error types for the sensor index.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the crate can report.
///
/// The in-memory index itself never fails: inserts, splits, scans and range
/// deletions always succeed. Errors come only from the two boundaries, input
/// conversion (`InvalidInput`) and the record store (everything else).
/// A missing key or sensor is an empty result, not an error.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the record store file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied field could not be converted.
    ///
    /// Raised before any tree is touched.
    #[error("Invalid {field} {value:?}: {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Requested page does not exist in the store file.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// Stored checksum does not match the page contents.
    #[error("Page {0} failed checksum verification")]
    ChecksumMismatch(u32),

    /// A record on a page could not be decoded.
    #[error("Corrupt record on page {page} at offset {offset}")]
    CorruptRecord { page: u32, offset: usize },

    /// A single record does not fit in an empty page.
    #[error("Record of {size} bytes exceeds page capacity of {max} bytes")]
    RecordTooLarge { size: usize, max: usize },
}

impl Error {
    pub(crate) fn invalid_input(
        field: &'static str,
        value: &str,
        reason: impl ToString,
    ) -> Self {
        Error::InvalidInput {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from input conversion rather than storage.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }
}
