//! On-disk cache infra.
//!
//! A typed facade around `cacache` for integrity-checked poster blobs.

pub mod poster_store;

pub use poster_store::*;
