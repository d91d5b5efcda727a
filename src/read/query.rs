use crate::common::attribute::Item;
use crate::common::condition::{self, AttributeComparison};
use crate::common::selection::Select;
use crate::read::common::{self, QueryOutput};
use crate::request::Query;
use crate::server::Operation;
use crate::table::Table;
use crate::{Error, Result};

use serde_json::Value;

impl Table {
    /// Query items matching the key conditions, first page only.
    ///
    /// Every query variant rejects operators outside the key condition set
    /// with [`Error::InvalidKeyCondition`] before sending anything.
    ///
    /// ```rust,no_run
    /// use dynamodb_rpc::Table;
    /// use dynamodb_rpc::common::attribute::AttributeValue;
    /// use dynamodb_rpc::common::condition::AttributeComparison;
    ///
    /// # fn example(table: &Table) -> dynamodb_rpc::Result<()> {
    /// let items = table.query(
    ///     &[
    ///         AttributeComparison::equals("user_id", AttributeValue::String("u1".to_string())),
    ///         AttributeComparison::greater_than(
    ///             "created_at",
    ///             AttributeValue::Number("0".to_string()),
    ///         ),
    ///     ],
    ///     true,
    /// )?;
    /// # let _ = items;
    /// # Ok(())
    /// # }
    /// ```
    pub fn query(&self, comparisons: &[AttributeComparison], is_retry: bool) -> Result<Vec<Item>> {
        let query = self.key_query(comparisons)?;
        self.run_query(&query, is_retry)
    }

    /// Query a secondary index.
    pub fn query_on_index(
        &self,
        comparisons: &[AttributeComparison],
        index_name: &str,
        is_retry: bool,
    ) -> Result<Vec<Item>> {
        let mut query = self.key_query(comparisons)?;
        query.add_index(index_name);
        self.run_query(&query, is_retry)
    }

    /// Query with a cap on the number of items evaluated.
    pub fn limited_query(
        &self,
        comparisons: &[AttributeComparison],
        limit: i64,
        is_retry: bool,
    ) -> Result<Vec<Item>> {
        let mut query = self.key_query(comparisons)?;
        query.add_limit(limit);
        self.run_query(&query, is_retry)
    }

    /// Query a secondary index with a cap on the number of items evaluated.
    pub fn limited_query_on_index(
        &self,
        comparisons: &[AttributeComparison],
        index_name: &str,
        limit: i64,
        is_retry: bool,
    ) -> Result<Vec<Item>> {
        let mut query = self.key_query(comparisons)?;
        query.add_index(index_name).add_limit(limit);
        self.run_query(&query, is_retry)
    }

    /// Count the items matching the key conditions without fetching them.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.count_query",
            skip_all,
            fields(table = %self.name()),
            err
        )
    )]
    pub fn count_query(&self, comparisons: &[AttributeComparison], is_retry: bool) -> Result<i64> {
        let mut query = self.key_query(comparisons)?;
        query.add_select(Select::Count);
        let body = self
            .server()
            .query_server(Operation::Query, &query, is_retry)?;
        let document = common::parse_document(&body)?;
        document
            .get("Count")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::unexpected_response(&body))
    }

    /// Run a prepared query and return one page with its continuation key.
    pub fn query_table(&self, query: &Query, is_retry: bool) -> Result<QueryOutput> {
        self.raw_query_table(&query.to_json()?, Operation::Query, is_retry)
    }

    /// Send a pre-serialized body and decode the response as a page of items.
    ///
    /// A response without `Count` is an error, except for [`Operation::UpdateItem`]
    /// where it yields an empty page.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.query",
            skip(self, body),
            fields(table = %self.name()),
            err
        )
    )]
    pub fn raw_query_table(
        &self,
        body: &str,
        operation: Operation,
        is_retry: bool,
    ) -> Result<QueryOutput> {
        let response = self.server().raw_query_server(operation, body, is_retry)?;
        parse_query(self, &response, operation)
    }

    fn key_query(&self, comparisons: &[AttributeComparison]) -> Result<Query> {
        condition::check_key_conditions(comparisons)?;
        let mut query = Query::new(self);
        query.add_key_conditions(comparisons);
        Ok(query)
    }

    fn run_query(&self, query: &Query, is_retry: bool) -> Result<Vec<Item>> {
        self.query_table(query, is_retry).map(|output| output.items)
    }
}

pub(crate) fn parse_query(table: &Table, body: &[u8], operation: Operation) -> Result<QueryOutput> {
    let document = common::parse_document(body)?;
    let count = match document.get("Count").and_then(Value::as_i64) {
        Some(count) => count,
        None if operation == Operation::UpdateItem => return Ok(QueryOutput::default()),
        None => return Err(Error::unexpected_response(body)),
    };
    let items = document.get("Items").and_then(Value::as_array);
    let items = (0..usize::try_from(count).unwrap_or_default())
        .map(|index| {
            let item = items
                .and_then(|items| items.get(index))
                .ok_or_else(|| Error::unexpected_response(body))?;
            common::parse_item(item, body)
        })
        .collect::<Result<Vec<_>>>()?;
    let last_evaluated_key = common::parse_continuation(&document, table.key_schema(), body)?;
    Ok(QueryOutput {
        items,
        count,
        last_evaluated_key,
    })
}
