//! Core types for the gridload service.
//!
//! Everything in this crate is pure: domain records, query descriptors,
//! repository contracts and error mappings. Storage backends and the HTTP
//! layer live in the `gridload` binary crate.

pub mod grid;
pub mod movies;
pub mod serde;
pub mod storage;
