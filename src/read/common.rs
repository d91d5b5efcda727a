use crate::common::attribute::{self, Item};
use crate::common::key::{Key, KeySchema};
use crate::{Error, Result};

use serde_json::{Map, Value};

/// Decoded page of a query or scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOutput {
    /// Items of this page, in response order.
    pub items: Vec<Item>,
    /// Number of items the service matched on this page.
    pub count: i64,
    /// Continuation key to resume from, absent on the last page.
    pub last_evaluated_key: Option<Key>,
}

impl QueryOutput {
    /// Whether more pages follow.
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

/// Parse a response body into its top-level JSON object.
pub(crate) fn parse_document(body: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice(body)? {
        Value::Object(document) => Ok(document),
        _ => Err(Error::unexpected_response(body)),
    }
}

/// Decode a wire item, failing when `value` is not an object.
pub(crate) fn parse_item(value: &Value, body: &[u8]) -> Result<Item> {
    value
        .as_object()
        .map(attribute::decode_item)
        .ok_or_else(|| Error::unexpected_response(body))
}

/// Decode a list of wire items.
pub(crate) fn parse_items(value: &Value, body: &[u8]) -> Result<Vec<Item>> {
    value
        .as_array()
        .ok_or_else(|| Error::unexpected_response(body))?
        .iter()
        .map(|item| parse_item(item, body))
        .collect()
}

/// Decode a `LastEvaluatedKey` against the table schema.
///
/// An absent or `null` key marks the last page.
pub(crate) fn parse_continuation(
    document: &Map<String, Value>,
    key_schema: &KeySchema,
    body: &[u8],
) -> Result<Option<Key>> {
    let value = match document.get("LastEvaluatedKey") {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    value
        .as_object()
        .and_then(|object| key_schema.parse_key(object))
        .map(Some)
        .ok_or_else(|| Error::unexpected_response(body))
}
