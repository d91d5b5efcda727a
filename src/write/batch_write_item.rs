use crate::common::attribute::{self, Attribute, AttributeValue};
use crate::read;
use crate::request::Query;
use crate::server::{Operation, Server};
use crate::table::Table;
use crate::{Error, Result};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// Kind of write requested for a group of items in a batch.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WriteAction {
    /// Create or replace each item.
    Put,
    /// Delete each item; the attributes are its key.
    Delete,
}

/// One request of a batch write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteRequest {
    /// Put the full item.
    Put(Vec<Attribute>),
    /// Delete the item with this key.
    Delete(Vec<Attribute>),
}

/// Requests the service left unprocessed, per table name.
pub type UnprocessedItems = IndexMap<String, Vec<WriteRequest>>;

#[derive(Serialize)]
enum WireWriteRequest {
    PutRequest {
        #[serde(rename = "Item")]
        item: IndexMap<String, AttributeValue>,
    },
    DeleteRequest {
        #[serde(rename = "Key")]
        key: IndexMap<String, AttributeValue>,
    },
}

impl Serialize for WriteRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Put(attributes) => WireWriteRequest::PutRequest {
                item: attribute::encode_attributes(attributes),
            },
            Self::Delete(attributes) => WireWriteRequest::DeleteRequest {
                key: attribute::encode_attributes(attributes),
            },
        };
        wire.serialize(serializer)
    }
}

impl WriteRequest {
    /// Build a request of the given kind.
    pub fn new(action: WriteAction, attributes: Vec<Attribute>) -> Self {
        match action {
            WriteAction::Put => Self::Put(attributes),
            WriteAction::Delete => Self::Delete(attributes),
        }
    }

    /// The kind of write.
    pub fn action(&self) -> WriteAction {
        match self {
            Self::Put(_) => WriteAction::Put,
            Self::Delete(_) => WriteAction::Delete,
        }
    }

    /// The item of a put, or the key of a delete.
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::Put(attributes) | Self::Delete(attributes) => attributes,
        }
    }

    /// Decode a wire write request; attributes of unknown type are dropped.
    pub fn decode(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let (action, field, payload) = if let Some(put) = object.get("PutRequest") {
            (WriteAction::Put, "Item", put)
        } else {
            (WriteAction::Delete, "Key", object.get("DeleteRequest")?)
        };
        let attributes = payload
            .get(field)?
            .as_object()?
            .iter()
            .filter_map(|(name, value)| Attribute::decode(name.as_str(), value))
            .collect();
        Some(Self::new(action, attributes))
    }
}

/// A batch write spanning one or more tables.
///
/// Tables are identified by name; adding a table again replaces its requests.
/// A partial failure is reported as [`Error::UnprocessedItems`], whose content
/// can be sent again with [`BatchWriteItem::resubmit`].
///
/// ```rust,no_run
/// use dynamodb_rpc::{Error, Table};
/// use dynamodb_rpc::common::attribute::Attribute;
/// use dynamodb_rpc::write::batch_write_item::WriteAction;
/// use indexmap::IndexMap;
///
/// # fn example(table: &Table) -> dynamodb_rpc::Result<()> {
/// let mut batch = table.batch_write_items(IndexMap::from([
///     (WriteAction::Put, vec![vec![Attribute::string("id", "1"), Attribute::number("n", "1")]]),
///     (WriteAction::Delete, vec![vec![Attribute::string("id", "2")]]),
/// ]));
/// loop {
///     match batch.execute(true) {
///         Ok(()) => break,
///         Err(Error::UnprocessedItems(unprocessed)) => batch = batch.resubmit(unprocessed),
///         Err(error) => return Err(error),
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BatchWriteItem {
    server: Arc<Server>,
    items: IndexMap<String, Vec<WriteRequest>>,
}

impl Table {
    /// Start a batch write with requests for this table.
    pub fn batch_write_items(
        &self,
        actions: IndexMap<WriteAction, Vec<Vec<Attribute>>>,
    ) -> BatchWriteItem {
        BatchWriteItem {
            server: self.server().clone(),
            items: IndexMap::from([(self.name().to_string(), write_requests(actions))]),
        }
    }
}

fn write_requests(actions: IndexMap<WriteAction, Vec<Vec<Attribute>>>) -> Vec<WriteRequest> {
    actions
        .into_iter()
        .flat_map(|(action, items)| {
            items
                .into_iter()
                .map(move |attributes| WriteRequest::new(action, attributes))
        })
        .collect()
}

impl BatchWriteItem {
    /// Add requests for another table, replacing any already added for it.
    pub fn add_table(
        &mut self,
        table: &Table,
        actions: IndexMap<WriteAction, Vec<Vec<Attribute>>>,
    ) -> &mut Self {
        self.items
            .insert(table.name().to_string(), write_requests(actions));
        self
    }

    /// A batch on the same server carrying exactly the unprocessed requests.
    pub fn resubmit(&self, unprocessed: UnprocessedItems) -> Self {
        Self {
            server: self.server.clone(),
            items: unprocessed,
        }
    }

    /// The requests of this batch, per table name.
    pub fn items(&self) -> &IndexMap<String, Vec<WriteRequest>> {
        &self.items
    }

    /// Send the batch.
    ///
    /// Returns [`Error::UnprocessedItems`] with the exact unprocessed subset
    /// when the service did not apply every request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.batch_write_item",
            skip(self),
            fields(tables = self.items.len()),
            err
        )
    )]
    pub fn execute(&self, is_retry: bool) -> Result<()> {
        let mut query = Query::empty();
        query.add_write_request_items(&self.items);
        let body = self
            .server
            .query_server(Operation::BatchWriteItem, &query, is_retry)?;
        let unprocessed = parse_batch_write_item(&body)?;
        if unprocessed.is_empty() {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::info!(
            tables = unprocessed.len(),
            requests = unprocessed.values().map(Vec::len).sum::<usize>(),
            "batch write left unprocessed items"
        );
        Err(Error::UnprocessedItems(unprocessed))
    }
}

pub(crate) fn parse_batch_write_item(body: &[u8]) -> Result<UnprocessedItems> {
    let document = read::common::parse_document(body)?;
    let unprocessed = document
        .get("UnprocessedItems")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::unexpected_response(body))?;
    unprocessed
        .iter()
        .map(|(table_name, requests)| {
            let requests = requests
                .as_array()
                .and_then(|requests| {
                    requests
                        .iter()
                        .map(WriteRequest::decode)
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| Error::unexpected_response(body))?;
            Ok::<_, Error>((table_name.clone(), requests))
        })
        .collect()
}
