//! Catalog pagination: one independently resumable cursor per
//! representation, with at most one fetch in flight for each.

pub mod cursor;
pub mod pager;
pub mod slot;

pub use cursor::PageCursor;
pub use pager::{CatalogPager, PageLoad};
pub use slot::{FetchSlot, FetchTicket};
