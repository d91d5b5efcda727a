use crate::common::condition::Expected;
use crate::common::key::Key;
use crate::request::Query;
use crate::server::Operation;
use crate::table::Table;
use crate::write::common;
use crate::Result;

impl Table {
    /// Delete the item with this key. Deleting a missing item succeeds.
    pub fn delete_item(&self, key: &Key, is_retry: bool) -> Result<()> {
        self.delete(key, None, is_retry)
    }

    /// Delete the item only if every expectation holds.
    pub fn conditional_delete_item(
        &self,
        key: &Key,
        expected: &[Expected],
        is_retry: bool,
    ) -> Result<()> {
        self.delete(key, Some(expected), is_retry)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.delete_item",
            skip(self, expected),
            fields(table = %self.name()),
            err
        )
    )]
    fn delete(&self, key: &Key, expected: Option<&[Expected]>, is_retry: bool) -> Result<()> {
        let mut query = Query::new(self);
        query.add_key(key);
        if let Some(expected) = expected {
            query.add_expected(expected);
        }
        let body = self
            .server()
            .query_server(Operation::DeleteItem, &query, is_retry)?;
        common::check_response(&body)
    }
}
