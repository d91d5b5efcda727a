use crate::common::attribute::{Attribute, AttributeValue};
use crate::common::condition::Expected;
use crate::common::key::Key;
use crate::request::Query;
use crate::server::Operation;
use crate::table::Table;
use crate::write::common;
use crate::{Error, Result};

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Action applied to every attribute of an update.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateAction {
    /// Replace the attribute value.
    Put,
    /// Add to a number, or union into a set.
    Add,
    /// Remove the attribute, or subtract members from a set.
    Delete,
}

impl UpdateAction {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Add => "ADD",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<AttributeValue>,
    action: UpdateAction,
}

/// Encode attribute updates; a DELETE of a scalar carries no value.
pub(crate) fn encode_updates(
    attributes: &[Attribute],
    action: UpdateAction,
) -> IndexMap<String, WireUpdate> {
    attributes
        .iter()
        .map(|attribute| {
            let value = match action {
                UpdateAction::Delete if !attribute.attribute_type().is_set() => None,
                _ => Some(attribute.value.clone()),
            };
            (attribute.name.clone(), WireUpdate { value, action })
        })
        .collect()
}

impl Table {
    /// Add numbers to numeric attributes, or members to set attributes.
    pub fn add_attributes(
        &self,
        key: &Key,
        attributes: &[Attribute],
        is_retry: bool,
    ) -> Result<()> {
        self.modify_attributes(key, attributes, None, UpdateAction::Add, is_retry)
    }

    /// Replace attribute values.
    pub fn update_attributes(
        &self,
        key: &Key,
        attributes: &[Attribute],
        is_retry: bool,
    ) -> Result<()> {
        self.modify_attributes(key, attributes, None, UpdateAction::Put, is_retry)
    }

    /// Remove attributes, or remove members from set attributes.
    ///
    /// ```rust,no_run
    /// use dynamodb_rpc::Table;
    /// use dynamodb_rpc::common::attribute::Attribute;
    ///
    /// # fn example(table: &Table) -> dynamodb_rpc::Result<()> {
    /// let key = table.key("u1", None);
    /// table.delete_attributes(
    ///     &key,
    ///     &[
    ///         // Removes the whole attribute.
    ///         Attribute::string("nickname", ""),
    ///         // Removes a single member.
    ///         Attribute::string_set("tags", ["beta"]),
    ///     ],
    ///     false,
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn delete_attributes(
        &self,
        key: &Key,
        attributes: &[Attribute],
        is_retry: bool,
    ) -> Result<()> {
        self.modify_attributes(key, attributes, None, UpdateAction::Delete, is_retry)
    }

    /// [`Table::add_attributes`] applied only if every expectation holds.
    pub fn conditional_add_attributes(
        &self,
        key: &Key,
        attributes: &[Attribute],
        expected: &[Expected],
        is_retry: bool,
    ) -> Result<()> {
        self.modify_attributes(key, attributes, Some(expected), UpdateAction::Add, is_retry)
    }

    /// [`Table::update_attributes`] applied only if every expectation holds.
    pub fn conditional_update_attributes(
        &self,
        key: &Key,
        attributes: &[Attribute],
        expected: &[Expected],
        is_retry: bool,
    ) -> Result<()> {
        self.modify_attributes(key, attributes, Some(expected), UpdateAction::Put, is_retry)
    }

    /// [`Table::delete_attributes`] applied only if every expectation holds.
    pub fn conditional_delete_attributes(
        &self,
        key: &Key,
        attributes: &[Attribute],
        expected: &[Expected],
        is_retry: bool,
    ) -> Result<()> {
        self.modify_attributes(key, attributes, Some(expected), UpdateAction::Delete, is_retry)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_rpc.update_item",
            skip(self, attributes, expected),
            fields(table = %self.name()),
            err
        )
    )]
    fn modify_attributes(
        &self,
        key: &Key,
        attributes: &[Attribute],
        expected: Option<&[Expected]>,
        action: UpdateAction,
        is_retry: bool,
    ) -> Result<()> {
        if attributes.is_empty() {
            return Err(Error::MissingAttributes);
        }
        let mut query = Query::new(self);
        query.add_key(key).add_updates(attributes, action);
        if let Some(expected) = expected {
            query.add_expected(expected);
        }
        let body = self
            .server()
            .query_server(Operation::UpdateItem, &query, is_retry)?;
        common::check_response(&body)
    }
}
