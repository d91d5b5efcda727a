//! Common types shared by read and write operations.
//!
//! This module holds the typed attribute codec, primary key types, comparison
//! and expectation clauses, projection types, and conversions to and from the
//! AWS SDK model.

/// Typed attributes and their tagged wire representation.
pub mod attribute;

/// Comparisons for key conditions and filters, and conditional-write expectations.
pub mod condition;

/// Conversions between this crate's attributes, the AWS SDK model and serde types.
pub mod convert;

/// Key schema and concrete primary keys.
pub mod key;

/// Select modes and attribute projection.
pub mod selection;
