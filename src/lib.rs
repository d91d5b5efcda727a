#![deny(missing_docs)]
#![deny(warnings)]

//! # DynamoDB RPC
//!
//! A blocking client for the DynamoDB JSON-over-HTTPS protocol, with typed
//! attributes, conditional writes, paginated queries, batch operations and
//! retries on throttling.
//!
//! ## Overview
//!
//! This library:
//! - Encodes and decodes the tagged attribute representation (`S`, `N`, `B`, `SS`, `NS`, `BS`)
//! - Builds request bodies from typed keys, conditions, expectations and update actions
//! - Sends them through a pluggable [`Transport`] and [`Signer`]
//! - Retries provisioned-throughput errors on request, and transient put failures always
//! - Reports "not found" and "unprocessed items" as dedicated [`Error`] variants
//!
//! ## Quick Example
//!
//! ```no_run
//! use dynamodb_rpc::common::attribute::{Attribute, AttributeValue};
//! use dynamodb_rpc::common::condition::{AttributeComparison, Expected};
//! use dynamodb_rpc::common::key::{KeyAttribute, KeySchema, ScalarType};
//! use dynamodb_rpc::{Credentials, Region, Server, Table, Transport};
//! use std::sync::Arc;
//!
//! # fn example(transport: impl Transport + 'static) -> dynamodb_rpc::Result<()> {
//! let server = Server::new(
//!     Region::new("us-east-1", "https://dynamodb.us-east-1.amazonaws.com"),
//!     Credentials::new("AKID", "secret"),
//!     transport,
//! );
//! let schema = KeySchema {
//!     hash: KeyAttribute::new("user_id", ScalarType::String),
//!     range: Some(KeyAttribute::new("created_at", ScalarType::Number)),
//! };
//! let table = Table::new("events", schema, Arc::new(server));
//!
//! // Write only if the item does not exist yet.
//! table.conditional_put_item(
//!     "u1",
//!     Some("1700000000"),
//!     vec![Attribute::string("kind", "login")],
//!     &[Expected::NotExists("user_id".to_string())],
//!     true,
//! )?;
//!
//! // Count one day of events.
//! let count = table.count_query(
//!     &[
//!         AttributeComparison::equals("user_id", AttributeValue::String("u1".to_string())),
//!         AttributeComparison::between(
//!             "created_at",
//!             AttributeValue::Number("1700000000".to_string()),
//!             AttributeValue::Number("1700086400".to_string()),
//!         ),
//!     ],
//!     true,
//! )?;
//! # let _ = count;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Attributes, keys, conditions and projections
//! - [`mod@read`] - Read operations (GetItem, Query, Scan, BatchGetItem)
//! - [`mod@write`] - Write operations (PutItem, UpdateItem, DeleteItem, BatchWriteItem)
//! - [`mod@server`] - Request execution, collaborators and retry settings

/// Attributes, keys, conditions and projections shared by every operation.
pub mod common;

/// Error types.
pub mod error;

/// Read operations.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying items with key conditions, on tables or indexes
/// - Scanning entire tables
/// - Batch retrieving items across tables
pub mod read;

/// The request body builder.
pub mod request;

/// Request execution against one endpoint.
pub mod server;

/// The table handle.
pub mod table;

/// Write operations.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Updating attributes with PUT, ADD and DELETE actions
/// - Deleting items by key
/// - Batch writing items across tables
pub mod write;

pub use error::{BoxError, Error, Result, ServiceError};
pub use read::common::QueryOutput;
pub use request::Query;
pub use server::retry::RetryConfig;
pub use server::transport::{
    Credentials, Region, Signer, Sleep, ThreadSleep, Transport, UnsignedSigner,
};
pub use server::{Operation, Server};
pub use table::Table;
