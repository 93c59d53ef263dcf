//! Content handling: sanitization, flexible-content blocks, and the page
//! creation service.

pub mod blocks;
pub mod filter;
pub mod page_service;
pub mod value;

pub use blocks::{BlockSanitization, LAYOUT_TAG, sanitize_blocks};
pub use filter::{sanitize_html, sanitize_plain_text};
pub use page_service::{CreatePageRequest, PageResponse, PageService};
