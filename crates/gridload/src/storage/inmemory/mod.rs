//! In-memory storage backend.
//!
//! This module provides an in-memory implementation of the repository traits
//! that stores all data in ordered maps wrapped in `Arc<RwLock<_>>`. Maps are
//! keyed like the DynamoDB tables, so iteration order matches the store's
//! ascending sort-key order. Used by the HTTP tests and by local runs built
//! with the `inmemory` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use gridload::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! repo.put_movie(&Movie::new(2013, "Rush")).await?;
//! ```

mod repository;

pub use repository::InMemoryRepository;
