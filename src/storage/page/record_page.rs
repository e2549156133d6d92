//! Packing sensor records into a page body.
//!
//! # Record layout
//! ```text
//! ┌──────────┬────────────┬───────────┬─────────┬──────────┬─────────┬──────────┬──────────┐
//! │ ts_len   │ timestamp  │ sensor_id │ value   │ loc_len  │location │ type_len │data_type │
//! │ u16      │ ts_len B   │ u32       │ f64     │ u16      │loc_len B│ u16      │type_len B│
//! └──────────┴────────────┴───────────┴─────────┴──────────┴─────────┴──────────┴──────────┘
//! ```
//! All integers little-endian; strings UTF-8. Records are packed back to
//! back from the start of the body; the header says how many there are.

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, Result, SensorId, SensorRecord, Timestamp};

use super::{Page, PageHeader, PageId, PageType};

/// Bytes available for records in one page.
pub const BODY_CAPACITY: usize = PAGE_SIZE - PageHeader::SIZE;

/// Fixed part of a record: three length prefixes, sensor id and value.
const FIXED_LEN: usize = 2 + 4 + 8 + 2 + 2;

/// Size of `record` once encoded.
pub fn encoded_len(record: &SensorRecord) -> usize {
    FIXED_LEN
        + record.timestamp.as_str().len()
        + record.location.len()
        + record.data_type.len()
}

/// Encoded size of a batch of records.
pub fn encoded_size(records: &[SensorRecord]) -> usize {
    records.iter().map(encoded_len).sum()
}

/// Build a checksummed page holding `records`.
///
/// # Errors
/// Returns `Error::RecordTooLarge` if the records do not fit in one body.
pub fn encode_records(records: &[SensorRecord]) -> Result<Page> {
    let size = encoded_size(records);
    if size > BODY_CAPACITY {
        return Err(Error::RecordTooLarge {
            size,
            max: BODY_CAPACITY,
        });
    }

    let mut page = Page::new();
    let mut writer = Writer {
        data: page.body_mut(),
        pos: 0,
    };
    for record in records {
        writer.record(record);
    }

    page.set_header(&PageHeader {
        page_type: PageType::Records,
        checksum: 0,
        record_count: records.len() as u16,
        used_bytes: size as u16,
    });
    page.update_checksum();
    Ok(page)
}

/// Read every record out of a page.
///
/// A zeroed page (allocated but never written) holds no records.
///
/// # Errors
/// - `Error::ChecksumMismatch` if the page fails verification
/// - `Error::CorruptRecord` if the body does not match the header
pub fn decode_records(page: &Page, page_id: PageId) -> Result<Vec<SensorRecord>> {
    if page.is_zeroed() {
        return Ok(Vec::new());
    }
    if !page.verify_checksum() {
        return Err(Error::ChecksumMismatch(page_id.0));
    }

    let header = page.header();
    if header.page_type != PageType::Records || usize::from(header.used_bytes) > BODY_CAPACITY {
        return Err(Error::CorruptRecord {
            page: page_id.0,
            offset: 0,
        });
    }

    let mut reader = Reader {
        data: &page.body()[..usize::from(header.used_bytes)],
        pos: 0,
    };
    let mut records = Vec::with_capacity(usize::from(header.record_count));

    for _ in 0..header.record_count {
        let start = reader.pos;
        let record = reader.record().ok_or(Error::CorruptRecord {
            page: page_id.0,
            offset: start,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Cursor filling a page body. Callers check the total size first.
struct Writer<'a> {
    data: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.data[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn string(&mut self, s: &str) {
        self.put(&(s.len() as u16).to_le_bytes());
        self.put(s.as_bytes());
    }

    fn record(&mut self, record: &SensorRecord) {
        self.string(record.timestamp.as_str());
        self.put(&record.sensor_id.0.to_le_bytes());
        self.put(&record.value.to_le_bytes());
        self.string(&record.location);
        self.string(&record.data_type);
    }
}

/// Bounds-checked cursor over a page body.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos.checked_add(n)?)?;
        self.pos += n;
        Some(bytes)
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }

    fn string(&mut self) -> Option<String> {
        let len = u16::from_le_bytes(self.array()?);
        let bytes = self.take(usize::from(len))?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn record(&mut self) -> Option<SensorRecord> {
        let timestamp = Timestamp::from(self.string()?);
        let sensor_id = SensorId(u32::from_le_bytes(self.array()?));
        let value = f64::from_le_bytes(self.array()?);
        let location = self.string()?;
        let data_type = self.string()?;

        Some(SensorRecord {
            timestamp,
            sensor_id,
            value,
            location,
            data_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SensorRecord> {
        vec![
            SensorRecord::new("2024-01-01 00:00:00", 10001, 25.0, "Field_1", "Temp"),
            SensorRecord::new("2024-01-01 00:05:00", 10002, -3.5, "Field_2", "Humidity"),
        ]
    }

    #[test]
    fn test_encoded_len() {
        let record = &sample()[0];
        assert_eq!(encoded_len(record), FIXED_LEN + 19 + 7 + 4);
    }

    #[test]
    fn test_encode_decode() {
        let records = sample();
        let page = encode_records(&records).unwrap();

        let header = page.header();
        assert_eq!(header.page_type, PageType::Records);
        assert_eq!(header.record_count, 2);
        assert_eq!(usize::from(header.used_bytes), encoded_size(&records));

        assert_eq!(decode_records(&page, PageId::new(0)).unwrap(), records);
    }

    #[test]
    fn test_zeroed_page_is_empty() {
        assert!(decode_records(&Page::new(), PageId::new(3)).unwrap().is_empty());
    }

    #[test]
    fn test_corruption_detected() {
        let mut page = encode_records(&sample()).unwrap();
        page.body_mut()[5] ^= 0xFF;

        match decode_records(&page, PageId::new(7)) {
            Err(Error::ChecksumMismatch(7)) => {}
            other => panic!("Expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_count_is_corrupt_record() {
        let mut page = encode_records(&sample()).unwrap();
        let mut header = page.header();
        header.record_count = 3;
        page.set_header(&header);
        page.update_checksum();

        assert!(matches!(
            decode_records(&page, PageId::new(1)),
            Err(Error::CorruptRecord { page: 1, .. })
        ));
    }

    #[test]
    fn test_too_large() {
        let huge = SensorRecord::new("2024-01-01 00:00:00", 1, 0.0, "x".repeat(BODY_CAPACITY), "T");
        assert!(matches!(
            encode_records(&[huge]),
            Err(Error::RecordTooLarge { .. })
        ));
    }
}
