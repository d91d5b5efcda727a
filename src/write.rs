//! Write operations: puts, deletes, attribute updates and batch writes.
//!
//! Each write may be made conditional on the current state of the item through
//! [`Expected`](crate::common::condition::Expected) clauses.

/// Batch write across tables, with resubmission of unprocessed requests.
pub mod batch_write_item;

/// Response checks shared by the write operations.
pub mod common;

/// Item deletion by primary key.
pub mod delete_item;

/// Item creation or replacement, retried on transient failures.
pub mod put_item;

/// Attribute-level updates with PUT, ADD and DELETE actions.
pub mod update_item;
