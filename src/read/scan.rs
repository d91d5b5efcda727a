use crate::common::attribute::Item;
use crate::common::condition::AttributeComparison;
use crate::read::common::QueryOutput;
use crate::request::Query;
use crate::server::Operation;
use crate::table::Table;
use crate::Result;

impl Table {
    /// Scan the table, keeping items that pass every filter; first page only.
    pub fn scan(&self, filters: &[AttributeComparison], is_retry: bool) -> Result<Vec<Item>> {
        let mut query = Query::new(self);
        if !filters.is_empty() {
            query.add_scan_filter(filters);
        }
        self.scan_page(&query, is_retry).map(|output| output.items)
    }

    /// Run a prepared scan and return one page with its continuation key.
    ///
    /// ```rust,no_run
    /// use dynamodb_rpc::{Query, Table};
    ///
    /// # fn example(table: &Table) -> dynamodb_rpc::Result<()> {
    /// let mut query = Query::new(table);
    /// query.add_limit(100);
    /// let mut items = Vec::new();
    /// loop {
    ///     let page = table.scan_page(&query, true)?;
    ///     items.extend(page.items);
    ///     match page.last_evaluated_key {
    ///         Some(key) => query.add_exclusive_start_key(&key),
    ///         None => break,
    ///     };
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn scan_page(&self, query: &Query, is_retry: bool) -> Result<QueryOutput> {
        self.raw_query_table(&query.to_json()?, Operation::Scan, is_retry)
    }
}
