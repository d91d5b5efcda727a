use crate::common::attribute::Attribute;
use crate::common::condition::Expected;
use crate::request::Query;
use crate::server::Operation;
use crate::table::Table;
use crate::write::common;
use crate::{Error, Result};

impl Table {
    /// Create or replace an item.
    ///
    /// The key attributes built from `hash` and `range` are appended to
    /// `attributes`. Transient failures (HTTP 500 and throttling) are retried
    /// with exponential backoff, see [`RetryConfig`](crate::RetryConfig).
    ///
    /// ```rust,no_run
    /// use dynamodb_rpc::Table;
    /// use dynamodb_rpc::common::attribute::Attribute;
    ///
    /// # fn example(table: &Table) -> dynamodb_rpc::Result<()> {
    /// table.put_item(
    ///     "u1",
    ///     None,
    ///     vec![
    ///         Attribute::string("name", "Jane"),
    ///         Attribute::string_set("tags", ["admin", "beta"]),
    ///     ],
    ///     true,
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn put_item(
        &self,
        hash: &str,
        range: Option<&str>,
        attributes: Vec<Attribute>,
        is_retry: bool,
    ) -> Result<()> {
        self.put(hash, range, attributes, None, is_retry)
    }

    /// Create or replace an item only if every expectation holds.
    pub fn conditional_put_item(
        &self,
        hash: &str,
        range: Option<&str>,
        attributes: Vec<Attribute>,
        expected: &[Expected],
        is_retry: bool,
    ) -> Result<()> {
        self.put(hash, range, attributes, Some(expected), is_retry)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.put_item",
            skip(self, attributes, expected),
            fields(table = %self.name()),
            err
        )
    )]
    fn put(
        &self,
        hash: &str,
        range: Option<&str>,
        mut attributes: Vec<Attribute>,
        expected: Option<&[Expected]>,
        is_retry: bool,
    ) -> Result<()> {
        if attributes.is_empty() {
            return Err(Error::MissingAttributes);
        }
        attributes.extend(self.key(hash, range).into_attributes());
        let mut query = Query::new(self);
        query.add_item(&attributes);
        if let Some(expected) = expected {
            query.add_expected(expected);
        }
        let server = self.server();
        let body =
            server.retry_write(|| server.query_server(Operation::PutItem, &query, is_retry))?;
        common::check_response(&body)
    }
}
