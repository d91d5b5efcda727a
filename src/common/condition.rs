use crate::common::attribute::{Attribute, AttributeValue};
use crate::{Error, Result};

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Comparison operators for key conditions and scan filters.
///
/// Key conditions accept `EQ`, `LE`, `LT`, `GE`, `GT`, `BEGINS_WITH` and `BETWEEN`;
/// the remaining operators are only meaningful in scan filters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than or equal.
    Le,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Greater than.
    Gt,
    /// String prefix match.
    BeginsWith,
    /// Inclusive range, two operands.
    Between,
    /// Attribute exists.
    NotNull,
    /// Attribute does not exist.
    Null,
    /// Substring or set membership.
    Contains,
    /// Negated `Contains`.
    NotContains,
    /// Equal to any of the operands.
    In,
}

impl ComparisonOperator {
    /// The wire name of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::Ge => "GE",
            Self::Gt => "GT",
            Self::BeginsWith => "BEGINS_WITH",
            Self::Between => "BETWEEN",
            Self::NotNull => "NOT_NULL",
            Self::Null => "NULL",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::In => "IN",
        }
    }

    /// Whether the operator may appear in a range key condition.
    pub fn is_key_condition(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Le
                | Self::Lt
                | Self::Ge
                | Self::Gt
                | Self::BeginsWith
                | Self::Between
        )
    }

    fn check_arity(self, actual: usize) -> Result<()> {
        let (valid, expected) = match self {
            Self::Between => (actual == 2, "2"),
            Self::NotNull | Self::Null => (actual == 0, "0"),
            Self::In => (actual >= 1, "at least 1"),
            _ => (actual == 1, "1"),
        };
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidComparison {
                operator: self.as_str(),
                expected,
                actual,
            })
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comparison of one attribute against zero, one or two operands.
///
/// ```rust
/// use dynamodb_rpc::common::attribute::AttributeValue;
/// use dynamodb_rpc::common::condition::{AttributeComparison, ComparisonOperator};
///
/// let between = AttributeComparison::between(
///     "at",
///     AttributeValue::Number("1".to_string()),
///     AttributeValue::Number("9".to_string()),
/// );
/// assert_eq!(between.operator(), ComparisonOperator::Between);
/// assert!(AttributeComparison::new("at", ComparisonOperator::Between, vec![]).is_err());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeComparison {
    name: String,
    operator: ComparisonOperator,
    values: Vec<AttributeValue>,
}

impl AttributeComparison {
    /// Create a comparison, checking the operand count against the operator.
    pub fn new(
        name: impl Into<String>,
        operator: ComparisonOperator,
        values: Vec<AttributeValue>,
    ) -> Result<Self> {
        operator.check_arity(values.len())?;
        Ok(Self {
            name: name.into(),
            operator,
            values,
        })
    }

    fn unary(name: impl Into<String>, operator: ComparisonOperator, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            operator,
            values: vec![value],
        }
    }

    /// `name = value`
    pub fn equals(name: impl Into<String>, value: AttributeValue) -> Self {
        Self::unary(name, ComparisonOperator::Eq, value)
    }

    /// `name <= value`
    pub fn less_than_or_equal(name: impl Into<String>, value: AttributeValue) -> Self {
        Self::unary(name, ComparisonOperator::Le, value)
    }

    /// `name < value`
    pub fn less_than(name: impl Into<String>, value: AttributeValue) -> Self {
        Self::unary(name, ComparisonOperator::Lt, value)
    }

    /// `name >= value`
    pub fn greater_than_or_equal(name: impl Into<String>, value: AttributeValue) -> Self {
        Self::unary(name, ComparisonOperator::Ge, value)
    }

    /// `name > value`
    pub fn greater_than(name: impl Into<String>, value: AttributeValue) -> Self {
        Self::unary(name, ComparisonOperator::Gt, value)
    }

    /// `begins_with(name, prefix)`
    pub fn begins_with(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::unary(
            name,
            ComparisonOperator::BeginsWith,
            AttributeValue::String(prefix.into()),
        )
    }

    /// `name BETWEEN low AND high`
    pub fn between(name: impl Into<String>, low: AttributeValue, high: AttributeValue) -> Self {
        Self {
            name: name.into(),
            operator: ComparisonOperator::Between,
            values: vec![low, high],
        }
    }

    /// Equality against an attribute, using its name and value.
    pub fn from_attribute(attribute: &Attribute) -> Self {
        Self::equals(attribute.name.clone(), attribute.value.clone())
    }

    /// The attribute being compared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operator.
    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    /// The operands, matching the operator's arity.
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }
}

/// Fail on the first comparison whose operator is not allowed in a key condition.
pub(crate) fn check_key_conditions(comparisons: &[AttributeComparison]) -> Result<()> {
    match comparisons
        .iter()
        .find(|comparison| !comparison.operator.is_key_condition())
    {
        Some(comparison) => Err(Error::InvalidKeyCondition {
            name: comparison.name.clone(),
            operator: comparison.operator.as_str(),
        }),
        None => Ok(()),
    }
}

/// Wire form of one comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireCondition {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attribute_value_list: Vec<AttributeValue>,
    comparison_operator: ComparisonOperator,
}

pub(crate) fn encode_comparisons(
    comparisons: &[AttributeComparison],
) -> IndexMap<String, WireCondition> {
    comparisons
        .iter()
        .map(|comparison| {
            let condition = WireCondition {
                attribute_value_list: comparison.values.clone(),
                comparison_operator: comparison.operator,
            };
            (comparison.name.clone(), condition)
        })
        .collect()
}

/// A conditional write expectation on one attribute.
///
/// ```rust
/// use dynamodb_rpc::common::attribute::Attribute;
/// use dynamodb_rpc::common::condition::Expected;
///
/// let expected = vec![
///     Expected::Exists(Attribute::number("version", "3")),
///     Expected::NotExists("deleted_at".to_string()),
/// ];
/// # let _ = expected;
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expected {
    /// The attribute must currently hold this value.
    Value(Attribute),
    /// The attribute must exist and hold this value.
    Exists(Attribute),
    /// The attribute must not exist.
    NotExists(String),
}

impl Expected {
    /// The name of the attribute the expectation applies to.
    pub fn name(&self) -> &str {
        match self {
            Self::Value(attribute) | Self::Exists(attribute) => &attribute.name,
            Self::NotExists(name) => name,
        }
    }
}

/// Wire form of one expectation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireExpected {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<AttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

impl From<&Expected> for WireExpected {
    fn from(expected: &Expected) -> Self {
        match expected {
            Expected::Value(attribute) => Self {
                value: Some(attribute.value.clone()),
                exists: None,
            },
            Expected::Exists(attribute) => Self {
                value: Some(attribute.value.clone()),
                exists: Some(true),
            },
            Expected::NotExists(_) => Self {
                value: None,
                exists: Some(false),
            },
        }
    }
}

pub(crate) fn encode_expected(expected: &[Expected]) -> IndexMap<String, WireExpected> {
    expected
        .iter()
        .map(|expected| (expected.name().to_string(), expected.into()))
        .collect()
}
