//! Read operations: single items, range queries, scans and batch gets.
//!
//! Every operation here is a method on [`Table`](crate::Table) or on the batch
//! object it returns, and decodes its response with the lenient attribute codec.

/// Batch get across tables.
pub mod batch_get_item;

/// Response decoding shared by the read operations.
pub mod common;

/// Single item lookup by primary key.
pub mod get_item;

/// Range queries on a table or a secondary index, with pagination.
pub mod query;

/// Full table scans with optional filters.
pub mod scan;
