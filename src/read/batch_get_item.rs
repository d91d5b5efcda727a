use crate::common::attribute::{AttributeValue, Item};
use crate::common::key::Key;
use crate::read::common;
use crate::request::Query;
use crate::server::{Operation, Server};
use crate::table::Table;
use crate::{Error, Result};

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Wire form of the keys requested from one table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireKeysAndAttributes {
    pub(crate) keys: Vec<IndexMap<String, AttributeValue>>,
}

/// A batch get spanning one or more tables.
///
/// Tables are identified by name; adding a table again replaces its keys.
///
/// ```rust,no_run
/// use dynamodb_rpc::Table;
///
/// # fn example(users: &Table, orders: &Table) -> dynamodb_rpc::Result<()> {
/// let responses = users
///     .batch_get_items(vec![users.key("u1", None), users.key("u2", None)])
///     .add_table(orders, vec![orders.key("o1", Some("1"))])
///     .execute(true)?;
/// for (table_name, items) in &responses {
///     println!("{table_name}: {} items", items.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BatchGetItem {
    server: Arc<Server>,
    keys: IndexMap<String, Vec<Key>>,
}

impl Table {
    /// Start a batch get with keys of this table.
    pub fn batch_get_items(&self, keys: Vec<Key>) -> BatchGetItem {
        BatchGetItem {
            server: self.server().clone(),
            keys: IndexMap::from([(self.name().to_string(), keys)]),
        }
    }
}

impl BatchGetItem {
    /// Request keys of another table, replacing any keys already added for it.
    pub fn add_table(&mut self, table: &Table, keys: Vec<Key>) -> &mut Self {
        self.keys.insert(table.name().to_string(), keys);
        self
    }

    /// The keys requested so far, per table name.
    pub fn keys(&self) -> &IndexMap<String, Vec<Key>> {
        &self.keys
    }

    /// Send the batch and decode the items returned per table name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.batch_get_item",
            skip(self),
            fields(tables = self.keys.len()),
            err
        )
    )]
    pub fn execute(&self, is_retry: bool) -> Result<IndexMap<String, Vec<Item>>> {
        let mut query = Query::empty();
        query.add_get_request_items(&self.keys);
        let body = self
            .server
            .query_server(Operation::BatchGetItem, &query, is_retry)?;
        parse_batch_get_item(&body)
    }
}

pub(crate) fn parse_batch_get_item(body: &[u8]) -> Result<IndexMap<String, Vec<Item>>> {
    let document = common::parse_document(body)?;
    let responses = document
        .get("Responses")
        .and_then(|responses| responses.as_object())
        .ok_or_else(|| Error::unexpected_response(body))?;
    responses
        .iter()
        .map(|(table_name, items)| {
            Ok::<_, Error>((table_name.clone(), common::parse_items(items, body)?))
        })
        .collect()
}
