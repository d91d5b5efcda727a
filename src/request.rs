//! The request builder: accumulates one wire request body.

use crate::common::attribute::{self, Attribute, AttributeValue};
use crate::common::condition::{self, AttributeComparison, Expected, WireCondition, WireExpected};
use crate::common::key::Key;
use crate::common::selection::{Projection, Select};
use crate::read::batch_get_item::WireKeysAndAttributes;
use crate::table::Table;
use crate::write::batch_write_item::WriteRequest;
use crate::write::update_item::{self, UpdateAction, WireUpdate};
use crate::Result;

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

type WireItem = IndexMap<String, AttributeValue>;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
enum RequestItems {
    Get(IndexMap<String, WireKeysAndAttributes>),
    Write(IndexMap<String, Vec<WriteRequest>>),
}

/// A single wire request body under construction.
///
/// Every `add_*` call overwrites its own field; nothing is merged. Serialization
/// is a pure function of the accumulated fields.
///
/// ```rust
/// use dynamodb_rpc::Query;
/// use dynamodb_rpc::common::attribute::AttributeValue;
/// use dynamodb_rpc::common::condition::AttributeComparison;
///
/// let mut query = Query::for_table_name("users");
/// query
///     .add_key_conditions(&[AttributeComparison::equals(
///         "id",
///         AttributeValue::String("1".to_string()),
///     )])
///     .add_limit(10)
///     .consistent_read(true);
/// assert_eq!(
///     serde_json::from_str::<serde_json::Value>(&query.to_json().unwrap()).unwrap(),
///     serde_json::json!({
///         "TableName": "users",
///         "KeyConditions": {
///             "id": {"AttributeValueList": [{"S": "1"}], "ComparisonOperator": "EQ"}
///         },
///         "Limit": 10,
///         "ConsistentRead": true
///     })
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<WireItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item: Option<WireItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<IndexMap<String, WireExpected>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute_updates: Option<IndexMap<String, WireUpdate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_conditions: Option<IndexMap<String, WireCondition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scan_filter: Option<IndexMap<String, WireCondition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    select: Option<Select>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes_to_get: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consistent_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusive_start_key: Option<WireItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_items: Option<RequestItems>,
}

impl Query {
    /// A request scoped to a table.
    pub fn new(table: &Table) -> Self {
        Self::for_table_name(table.name())
    }

    /// A request scoped to a table given by name.
    pub fn for_table_name(table_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            ..Default::default()
        }
    }

    /// A request with no table, for batch operations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the single-item key.
    pub fn add_key(&mut self, key: &Key) -> &mut Self {
        self.key = Some(key.to_wire());
        self
    }

    /// Set the full item payload of a put.
    pub fn add_item(&mut self, attributes: &[Attribute]) -> &mut Self {
        self.item = Some(attribute::encode_attributes(attributes));
        self
    }

    /// Set the conditional-write expectations.
    pub fn add_expected(&mut self, expected: &[Expected]) -> &mut Self {
        self.expected = Some(condition::encode_expected(expected));
        self
    }

    /// Set the update actions; `action` applies to every attribute given.
    pub fn add_updates(&mut self, attributes: &[Attribute], action: UpdateAction) -> &mut Self {
        self.attribute_updates = Some(update_item::encode_updates(attributes, action));
        self
    }

    /// Set the key conditions of a range query.
    ///
    /// Operators are not checked here; the [`Table`] query methods reject
    /// filter-only operators.
    pub fn add_key_conditions(&mut self, comparisons: &[AttributeComparison]) -> &mut Self {
        self.key_conditions = Some(condition::encode_comparisons(comparisons));
        self
    }

    /// Set the filter of a scan.
    pub fn add_scan_filter(&mut self, comparisons: &[AttributeComparison]) -> &mut Self {
        self.scan_filter = Some(condition::encode_comparisons(comparisons));
        self
    }

    /// Query a secondary index instead of the table.
    pub fn add_index(&mut self, index_name: impl Into<String>) -> &mut Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Cap the number of items evaluated.
    pub fn add_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Choose which attributes are returned.
    pub fn add_select(&mut self, select: Select) -> &mut Self {
        self.select = Some(select);
        self
    }

    /// Return only the projected attributes.
    pub fn add_attributes_to_get(&mut self, projection: Projection) -> &mut Self {
        self.attributes_to_get = Some(projection.into_names());
        self
    }

    /// Request a strongly consistent read.
    pub fn consistent_read(&mut self, consistent_read: bool) -> &mut Self {
        self.consistent_read = Some(consistent_read);
        self
    }

    /// Resume a paginated query or scan after this continuation key.
    pub fn add_exclusive_start_key(&mut self, key: &Key) -> &mut Self {
        self.exclusive_start_key = Some(key.to_wire());
        self
    }

    /// Set the keys of a batch get, per table name.
    pub fn add_get_request_items(&mut self, keys: &IndexMap<String, Vec<Key>>) -> &mut Self {
        let request_items = keys
            .iter()
            .map(|(table_name, keys)| {
                let keys = WireKeysAndAttributes {
                    keys: keys.iter().map(Key::to_wire).collect(),
                };
                (table_name.clone(), keys)
            })
            .collect();
        self.request_items = Some(RequestItems::Get(request_items));
        self
    }

    /// Set the write requests of a batch write, per table name.
    pub fn add_write_request_items(
        &mut self,
        requests: &IndexMap<String, Vec<WriteRequest>>,
    ) -> &mut Self {
        self.request_items = Some(RequestItems::Write(requests.clone()));
        self
    }

    /// The name of the table this request targets, if any.
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Serialize the accumulated document into the wire JSON body.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&body)
    }
}
