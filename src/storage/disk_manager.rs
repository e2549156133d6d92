//! Disk Manager - page-granular file I/O for the record store.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, Result};
use crate::storage::page::{Page, PageId};

/// Reads, writes and allocates pages of a single store file.
///
/// # File Layout
/// Pages sit back to back with no file header; page `n` covers bytes
/// `n * PAGE_SIZE .. (n + 1) * PAGE_SIZE`.
///
/// A trailing partial page (an interrupted allocation) is ignored on open
/// and overwritten by the next allocation.
///
/// # Durability
/// Every write and allocation is followed by `sync_data()`.
pub struct DiskManager {
    file: File,
    /// Number of whole pages in the file.
    page_count: u32,
}

impl DiskManager {
    /// Create a new store file.
    ///
    /// # Errors
    /// Fails if `path` already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
        })
    }

    /// Open an existing store file.
    ///
    /// # Errors
    /// Fails if `path` is missing or not readable and writable.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let file_size = file.metadata()?.len();
        let page_size = PAGE_SIZE as u64;
        let whole_pages = (file_size / page_size) as u32;
        let tail = file_size % page_size;
        if tail != 0 {
            log::warn!(
                "{}: ignoring {tail} trailing bytes after page {whole_pages}",
                path.as_ref().display()
            );
        }

        Ok(Self {
            file,
            page_count: whole_pages,
        })
    }

    /// Open an existing store file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Read a whole page back from the file.
    ///
    /// # Errors
    /// `Error::PageNotFound` for an id at or past [`page_count`](Self::page_count).
    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        self.check_allocated(page_id)?;

        self.file.seek(SeekFrom::Start(page_id.offset(PAGE_SIZE)))?;
        let mut buf = Page::default();
        self.file.read_exact(buf.as_mut_slice())?;
        Ok(buf)
    }

    /// Overwrite an allocated page in place.
    ///
    /// # Errors
    /// `Error::PageNotFound` for an id at or past [`page_count`](Self::page_count).
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_allocated(page_id)?;

        self.file.seek(SeekFrom::Start(page_id.offset(PAGE_SIZE)))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_data()?;

        Ok(())
    }

    /// Append a page holding `page` and return its id.
    ///
    /// Writing the contents as part of the allocation saves a second
    /// write of a zeroed page.
    pub fn allocate_page(&mut self, page: &Page) -> Result<PageId> {
        let page_id = PageId::new(self.page_count);

        self.file.seek(SeekFrom::Start(page_id.offset(PAGE_SIZE)))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_data()?;

        self.page_count += 1;
        Ok(page_id)
    }

    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Id of the highest allocated page, if any.
    pub fn last_page(&self) -> Option<PageId> {
        self.page_count.checked_sub(1).map(PageId::new)
    }

    /// Bytes covered by whole pages.
    #[inline]
    pub fn file_size(&self) -> u64 {
        u64::from(self.page_count) * PAGE_SIZE as u64
    }

    fn check_allocated(&self, page_id: PageId) -> Result<()> {
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn page_with(byte: u8) -> Page {
        let mut page = Page::new();
        page.body_mut()[0] = byte;
        page
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.db");

        let dm = DiskManager::create(&path).unwrap();
        assert_eq!(dm.page_count(), 0);
        assert_eq!(dm.last_page(), None);
        assert!(DiskManager::create(&path).is_err());
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        assert!(DiskManager::open(dir.path().join("missing.db")).is_err());
    }

    #[test]
    fn test_allocate_write_read() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("store.db")).unwrap();

        let first = dm.allocate_page(&page_with(1)).unwrap();
        let second = dm.allocate_page(&page_with(2)).unwrap();
        assert_eq!((first, second), (PageId::new(0), PageId::new(1)));
        assert_eq!(dm.last_page(), Some(second));
        assert_eq!(dm.file_size(), 2 * PAGE_SIZE as u64);

        dm.write_page(first, &page_with(9)).unwrap();
        assert_eq!(dm.read_page(first).unwrap().body()[0], 9);
        assert_eq!(dm.read_page(second).unwrap().body()[0], 2);
    }

    #[test]
    fn test_unallocated_page_not_found() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("store.db")).unwrap();

        assert!(matches!(dm.read_page(PageId::new(0)), Err(Error::PageNotFound(0))));
        assert!(matches!(
            dm.write_page(PageId::new(0), &Page::new()),
            Err(Error::PageNotFound(0))
        ));
    }

    #[test]
    fn test_reopen_ignores_partial_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let mut dm = DiskManager::open_or_create(&path).unwrap();
            dm.allocate_page(&page_with(0x42)).unwrap();
        }
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&[0xEE; 100]).unwrap();
        }

        let mut dm = DiskManager::open_or_create(&path).unwrap();
        assert_eq!(dm.page_count(), 1);
        assert_eq!(dm.read_page(PageId::new(0)).unwrap().body()[0], 0x42);

        // The next allocation lands on the partial tail.
        assert_eq!(dm.allocate_page(&page_with(7)).unwrap(), PageId::new(1));
        assert_eq!(dm.read_page(PageId::new(1)).unwrap().body()[0], 7);
    }
}
