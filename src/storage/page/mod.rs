//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The raw 4KB data container
//! - [`PageHeader`] - Metadata at the start of every page
//! - [`PageType`] - Discriminator for different page formats
//! - [`record_page`] - Packing sensor records into a page body

#[allow(clippy::module_inception)]
mod page;
mod page_header;
mod page_id;
pub mod record_page;

pub use page::Page;
pub use page_header::{PageHeader, PageType};
pub use page_id::PageId;
