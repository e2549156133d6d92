//! The 9-byte header at the front of every store page.

use std::ops::Range;

/// What a page holds.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// All-zero page, or a type byte this version does not know.
    #[default]
    Invalid = 0,
    /// Packed sensor records.
    Records = 1,
}

impl PageType {
    pub fn from_u8(byte: u8) -> Self {
        if byte == PageType::Records as u8 {
            PageType::Records
        } else {
            PageType::Invalid
        }
    }
}

/// Header fields of a record page.
///
/// # Layout
/// ```text
/// ┌──────┬──────────────┬──────────────┬──────────────┐
/// │ type │ crc32        │ record_count │ used_bytes   │
/// │ u8   │ u32 LE       │ u16 LE       │ u16 LE       │
/// │ 0    │ 1..5         │ 5..7         │ 7..9         │
/// └──────┴──────────────┴──────────────┴──────────────┘
/// ```
///
/// The CRC covers the whole page, reading the crc32 bytes as zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub checksum: u32,
    /// Records packed in the body.
    pub record_count: u16,
    /// Body bytes those records take up.
    pub used_bytes: u16,
}

impl PageHeader {
    pub const SIZE: usize = 9;

    const TYPE_AT: usize = 0;
    pub(crate) const CHECKSUM_RANGE: Range<usize> = 1..5;
    const COUNT_RANGE: Range<usize> = 5..7;
    const USED_RANGE: Range<usize> = 7..9;

    /// An empty header of the given type, checksum unset.
    pub fn new(page_type: PageType) -> Self {
        Self {
            page_type,
            ..Self::default()
        }
    }

    /// Decode the header from the front of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than [`PageHeader::SIZE`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let b = &bytes[..Self::SIZE];
        Self {
            page_type: PageType::from_u8(b[Self::TYPE_AT]),
            checksum: u32::from_le_bytes([b[1], b[2], b[3], b[4]]),
            record_count: u16::from_le_bytes([b[5], b[6]]),
            used_bytes: u16::from_le_bytes([b[7], b[8]]),
        }
    }

    /// Encode the header into the front of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than [`PageHeader::SIZE`].
    pub fn write_to(&self, bytes: &mut [u8]) {
        bytes[Self::TYPE_AT] = self.page_type as u8;
        bytes[Self::CHECKSUM_RANGE].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[Self::COUNT_RANGE].copy_from_slice(&self.record_count.to_le_bytes());
        bytes[Self::USED_RANGE].copy_from_slice(&self.used_bytes.to_le_bytes());
    }

    /// CRC32 of a whole page with the checksum bytes read as zero.
    pub fn compute_checksum(page: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        for part in [
            &page[..Self::CHECKSUM_RANGE.start],
            &[0u8; 4][..],
            &page[Self::CHECKSUM_RANGE.end..],
        ] {
            hasher.update(part);
        }
        hasher.finalize()
    }

    pub fn verify_checksum(&self, page: &[u8]) -> bool {
        Self::compute_checksum(page) == self.checksum
    }
}
