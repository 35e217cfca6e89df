//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the repository traits
//! using `aws-sdk-dynamodb`. The store client in
//! `store` performs the raw operations; the repository translates domain calls
//! into its operation descriptors.

mod conversions;
mod error;
mod expressions;
mod keys;
mod repository;
mod store;

pub use repository::DynamoDbRepository;
