//! One 4KB page of the store file.

use crate::common::config::PAGE_SIZE;

use super::page_header::PageHeader;

/// A page-aligned, page-sized byte buffer: a [`PageHeader`] followed by a
/// body that [`record_page`](super::record_page) packs records into.
///
/// Not `Clone`; pages are moved or rebuilt, never duplicated implicitly.
#[repr(align(4096))]
pub struct Page {
    bytes: [u8; PAGE_SIZE],
}

impl Page {
    /// An all-zero page, as read back from a freshly allocated slot.
    #[inline]
    pub fn new() -> Self {
        Self {
            bytes: [0; PAGE_SIZE],
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.bytes[PageHeader::SIZE..]
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[PageHeader::SIZE..]
    }

    pub fn is_zeroed(&self) -> bool {
        !self.bytes.iter().any(|&b| b != 0)
    }

    pub fn header(&self) -> PageHeader {
        PageHeader::from_bytes(&self.bytes)
    }

    pub fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.bytes);
    }

    /// Stamp the CRC of the current contents into the header. Must be the
    /// last write before the page goes to disk.
    pub fn update_checksum(&mut self) {
        let crc = PageHeader::compute_checksum(&self.bytes);
        self.bytes[PageHeader::CHECKSUM_RANGE].copy_from_slice(&crc.to_le_bytes());
    }

    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.bytes)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
