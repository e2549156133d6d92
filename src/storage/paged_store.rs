//! A [`RecordStore`] kept in a file of checksummed record pages.

use std::path::Path;

use crate::common::{Error, Result, SensorRecord, Timestamp};
use crate::storage::disk_manager::DiskManager;
use crate::storage::page::record_page::{
    decode_records, encode_records, encoded_len, encoded_size, BODY_CAPACITY,
};
use crate::storage::page::PageId;
use crate::storage::record_store::RecordStore;

/// Readings packed into 4KB pages, appended to the last page until it is
/// full.
///
/// Range deletion rewrites each page that loses a reading. Pages emptied
/// by a deletion stay in the file and are reused only if they are the
/// last page.
pub struct PagedStore {
    disk: DiskManager,
}

impl PagedStore {
    /// Create a new, empty store file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            disk: DiskManager::create(path)?,
        })
    }

    /// Open an existing store file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            disk: DiskManager::open(path)?,
        })
    }

    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            disk: DiskManager::open_or_create(path)?,
        })
    }

    #[inline]
    pub fn page_count(&self) -> u32 {
        self.disk.page_count()
    }

    fn read_records(&mut self, page_id: PageId) -> Result<Vec<SensorRecord>> {
        let page = self.disk.read_page(page_id)?;
        decode_records(&page, page_id)
    }
}

impl RecordStore for PagedStore {
    fn load_all(&mut self) -> Result<Vec<SensorRecord>> {
        let mut records = Vec::new();
        for n in 0..self.disk.page_count() {
            records.extend(self.read_records(PageId::new(n))?);
        }
        Ok(records)
    }

    fn append(&mut self, record: &SensorRecord) -> Result<()> {
        let size = encoded_len(record);
        if size > BODY_CAPACITY {
            return Err(Error::RecordTooLarge {
                size,
                max: BODY_CAPACITY,
            });
        }

        if let Some(last) = self.disk.last_page() {
            let mut records = self.read_records(last)?;
            if encoded_size(&records) + size <= BODY_CAPACITY {
                records.push(record.clone());
                return self.disk.write_page(last, &encode_records(&records)?);
            }
        }

        let page_id = self
            .disk
            .allocate_page(&encode_records(std::slice::from_ref(record))?)?;
        log::trace!("allocated {page_id} for sensor records");
        Ok(())
    }

    fn delete_range(&mut self, start: &Timestamp, end: &Timestamp) -> Result<usize> {
        let mut removed = 0;
        for n in 0..self.disk.page_count() {
            let page_id = PageId::new(n);
            let mut records = self.read_records(page_id)?;
            let before = records.len();
            records.retain(|r| r.timestamp < *start || r.timestamp > *end);

            if records.len() != before {
                removed += before - records.len();
                self.disk.write_page(page_id, &encode_records(&records)?)?;
            }
        }
        Ok(removed)
    }
}
