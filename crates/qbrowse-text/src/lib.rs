//! qbrowse-text
//!
//! Tantivy-backed implementation of [`qbrowse_core::traits::SearchIndex`]:
//! documents live in a RAM index and are queried with per-field boosts.

pub mod index;
pub mod tantivy_utils;

pub use index::TantivyIndex;
