//! qbrowse-core
//!
//! Domain types and the pure building blocks of the question browser: the
//! stable document hash, the corpus indexing pass, tag autocomplete, the
//! collaborator traits and the figment-backed configuration.

pub mod autocomplete;
pub mod config;
pub mod corpus;
pub mod error;
pub mod hash;
pub mod scan;
pub mod traits;
pub mod types;
