//! The table handle every operation is issued through.

use crate::common::key::{Key, KeySchema};
use crate::server::Server;

use std::sync::Arc;

/// A named table, its key schema and the server it lives on.
///
/// Tables hold no mutable state. Operations are implemented in the [`read`](crate::read)
/// and [`write`](crate::write) modules.
///
/// ```rust,no_run
/// use dynamodb_rpc::common::key::{KeyAttribute, KeySchema, ScalarType};
/// use dynamodb_rpc::{Server, Table};
/// use std::sync::Arc;
///
/// # fn example(server: Arc<Server>) -> dynamodb_rpc::Result<()> {
/// let schema = KeySchema {
///     hash: KeyAttribute::new("user_id", ScalarType::String),
///     range: Some(KeyAttribute::new("created_at", ScalarType::Number)),
/// };
/// let table = Table::new("events", schema, server);
/// let item = table.get_item(&table.key("u1", Some("1700000000")), false)?;
/// # let _ = item;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    key_schema: KeySchema,
    server: Arc<Server>,
}

impl Table {
    /// Create a table handle.
    pub fn new(name: impl Into<String>, key_schema: KeySchema, server: Arc<Server>) -> Self {
        Self {
            name: name.into(),
            key_schema,
            server,
        }
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primary key schema.
    pub fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    /// A key of this table with concrete values, see [`KeySchema::clone_with`].
    pub fn key(&self, hash: impl Into<String>, range: Option<&str>) -> Key {
        self.key_schema.clone_with(hash, range)
    }

    /// The server requests are sent to.
    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }
}
