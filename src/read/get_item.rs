use crate::common::attribute::Item;
use crate::common::key::Key;
use crate::read::common;
use crate::request::Query;
use crate::server::Operation;
use crate::table::Table;
use crate::{Error, Result};

impl Table {
    /// Fetch one item by key with an eventually consistent read.
    ///
    /// Returns [`Error::NotFound`] when no item matches. An item with no
    /// decodable attributes is returned as an empty [`Item`].
    pub fn get_item(&self, key: &Key, is_retry: bool) -> Result<Item> {
        self.get(key, false, is_retry)
    }

    /// Fetch one item by key, strongly consistent when `consistent` is set.
    pub fn get_item_consistent(&self, key: &Key, consistent: bool, is_retry: bool) -> Result<Item> {
        self.get(key, consistent, is_retry)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.get_item",
            skip(self),
            fields(table = %self.name()),
            err
        )
    )]
    fn get(&self, key: &Key, consistent: bool, is_retry: bool) -> Result<Item> {
        let mut query = Query::new(self);
        query.add_key(key);
        if consistent {
            query.consistent_read(true);
        }
        let body = self
            .server()
            .query_server(Operation::GetItem, &query, is_retry)?;
        parse_get_item(&body)
    }
}

pub(crate) fn parse_get_item(body: &[u8]) -> Result<Item> {
    let document = common::parse_document(body)?;
    match document.get("Item") {
        Some(item) => common::parse_item(item, body),
        None => Err(Error::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::attribute::Attribute;

    use rstest::rstest;

    #[test]
    fn test_parse_item_absent_is_not_found() {
        let error = parse_get_item(br#"{"ConsumedCapacityUnits":0.5}"#).unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_parse_empty_item_is_found() {
        let item = parse_get_item(br#"{"Item":{}}"#).unwrap();
        assert!(item.is_empty());
    }

    #[test]
    fn test_parse_item_drops_unknown_types() {
        let item = parse_get_item(br#"{"Item":{"a":{"S":"x"},"b":{"BOOL":true}}}"#).unwrap();
        assert_eq!(item.len(), 1);
        assert_eq!(item["a"], Attribute::string("a", "x"));
    }

    #[rstest]
    #[case::item_not_object(br#"{"Item":[]}"#.as_slice())]
    #[case::document_not_object(br#"[]"#.as_slice())]
    fn test_parse_unexpected(#[case] body: &[u8]) {
        let error = parse_get_item(body).unwrap_err();
        assert!(matches!(error, Error::UnexpectedResponse { .. }));
    }
}
