use crate::common::attribute::{Attribute, AttributeType, AttributeValue};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Scalar types allowed for key attributes.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
pub enum ScalarType {
    /// `S`
    #[default]
    #[serde(rename = "S")]
    String,
    /// `N`
    #[serde(rename = "N")]
    Number,
    /// `B`
    #[serde(rename = "B")]
    Binary,
}

impl ScalarType {
    /// Wrap a payload into a value of this type.
    pub fn value(self, payload: impl Into<String>) -> AttributeValue {
        let payload = payload.into();
        match self {
            Self::String => AttributeValue::String(payload),
            Self::Number => AttributeValue::Number(payload),
            Self::Binary => AttributeValue::Binary(payload),
        }
    }

    /// The attribute type carried by values of this scalar type.
    pub fn attribute_type(self) -> AttributeType {
        match self {
            Self::String => AttributeType::String,
            Self::Number => AttributeType::Number,
            Self::Binary => AttributeType::Binary,
        }
    }
}

/// Name and type of one key component.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
pub struct KeyAttribute {
    /// The attribute name.
    pub name: String,
    /// The scalar type.
    #[serde(rename = "type", default)]
    pub scalar_type: ScalarType,
}

impl KeyAttribute {
    /// Create a key attribute.
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
        }
    }

    /// Decode this component from a wire key object, rejecting other types.
    fn decode(&self, object: &Map<String, Value>) -> Option<Attribute> {
        object
            .get(&self.name)
            .and_then(|value| Attribute::decode(self.name.as_str(), value))
            .filter(|attribute| attribute.attribute_type() == self.scalar_type.attribute_type())
    }
}

/// Primary key schema of a table: a hash component and an optional range component.
///
/// ```rust
/// use dynamodb_rpc::common::key::{KeyAttribute, KeySchema, ScalarType};
///
/// let schema = KeySchema {
///     hash: KeyAttribute::new("id", ScalarType::String),
///     range: Some(KeyAttribute::new("at", ScalarType::Number)),
/// };
/// let key = schema.clone_with("1", Some("42"));
/// assert_eq!(key.hash_key_element.name, "id");
/// assert_eq!(key.range_key_element.unwrap().value.as_str(), Some("42"));
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
pub struct KeySchema {
    /// The hash (partition) key.
    pub hash: KeyAttribute,
    /// The range (sort) key, when the table defines one.
    #[serde(default)]
    pub range: Option<KeyAttribute>,
}

impl KeySchema {
    /// Build a fresh key from this template with concrete values.
    ///
    /// The range value is ignored when the schema has no range key, and an
    /// absent or empty range value leaves the range component unset.
    pub fn clone_with(&self, hash_value: impl Into<String>, range_value: Option<&str>) -> Key {
        let hash_key_element = Attribute::new(
            self.hash.name.clone(),
            self.hash.scalar_type.value(hash_value),
        );
        let range_key_element = match (&self.range, range_value) {
            (Some(range), Some(value)) if !value.is_empty() => Some(Attribute::new(
                range.name.clone(),
                range.scalar_type.value(value),
            )),
            _ => None,
        };
        Key {
            hash_key_element,
            range_key_element,
        }
    }

    /// Pick this schema's key components out of a wire key object.
    ///
    /// Returns `None` when the hash component is missing, undecodable or of
    /// another type than the schema declares. A range component in that state
    /// is left unset.
    pub(crate) fn parse_key(&self, object: &Map<String, Value>) -> Option<Key> {
        let hash_key_element = self.hash.decode(object)?;
        let range_key_element = self.range.as_ref().and_then(|range| {
            range
                .decode(object)
                .filter(|attribute| attribute.value.as_str() != Some(""))
        });
        Some(Key {
            hash_key_element,
            range_key_element,
        })
    }
}

/// A concrete primary key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// The hash component.
    pub hash_key_element: Attribute,
    /// The range component, present iff the table has a range key.
    pub range_key_element: Option<Attribute>,
}

impl Key {
    /// Create a key from its components.
    pub fn new(hash_key_element: Attribute, range_key_element: Option<Attribute>) -> Self {
        Self {
            hash_key_element,
            range_key_element,
        }
    }

    /// Iterate over the key components, hash first.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        std::iter::once(&self.hash_key_element).chain(self.range_key_element.as_ref())
    }

    /// Consume the key into its component attributes, hash first.
    pub fn into_attributes(self) -> Vec<Attribute> {
        let mut attributes = Vec::with_capacity(2);
        attributes.push(self.hash_key_element);
        attributes.extend(self.range_key_element);
        attributes
    }

    pub(crate) fn to_wire(&self) -> IndexMap<String, AttributeValue> {
        crate::common::attribute::encode_attributes(self.attributes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::json;

    fn schema(with_range: bool) -> KeySchema {
        KeySchema {
            hash: KeyAttribute::new("a", ScalarType::String),
            range: with_range.then(|| KeyAttribute::new("b", ScalarType::Number)),
        }
    }

    #[rstest]
    #[case::hash_only(
        schema(false),
        Some("2"),
        Key {
            hash_key_element: Attribute::string("a", "1"),
            range_key_element: None,
        }
    )]
    #[case::hash_and_range(
        schema(true),
        Some("2"),
        Key {
            hash_key_element: Attribute::string("a", "1"),
            range_key_element: Some(
                Attribute::number("b", "2")
            ),
        }
    )]
    #[case::empty_range(
        schema(true),
        Some(""),
        Key {
            hash_key_element: Attribute::string("a", "1"),
            range_key_element: None,
        }
    )]
    #[case::missing_range(
        schema(true),
        None,
        Key {
            hash_key_element: Attribute::string("a", "1"),
            range_key_element: None,
        }
    )]
    fn test_clone_with(
        #[case] schema: KeySchema,
        #[case] range_value: Option<&str>,
        #[case] expected: Key,
    ) {
        assert_eq!(schema.clone_with("1", range_value), expected);
    }

    #[test]
    fn test_clone_with_does_not_share_values() {
        let schema = schema(true);
        let first = schema.clone_with("1", Some("1"));
        let second = schema.clone_with("2", Some("2"));
        assert_ne!(first, second);
        assert_eq!(first.hash_key_element.name, second.hash_key_element.name);
    }

    #[rstest]
    #[case::hash_only(
        schema(false),
        json!({"a": {"S": "x"}, "b": {"N": "1"}}),
        Some(
            Key {
                hash_key_element: Attribute::string("a", "x"),
                range_key_element: None,
            }
        )
    )]
    #[case::hash_and_range(
        schema(true),
        json!({"a": {"S": "x"}, "b": {"N": "1"}}),
        Some(
            Key {
                hash_key_element: Attribute::string("a", "x"),
                range_key_element: Some(
                    Attribute::number("b", "1")
                ),
            }
        )
    )]
    #[case::empty_shaped_range(
        schema(true),
        json!({"a": {"S": "x"}, "b": {}}),
        Some(
            Key {
                hash_key_element: Attribute::string("a", "x"),
                range_key_element: None,
            }
        )
    )]
    #[case::empty_range_payload(
        schema(true),
        json!({"a": {"S": "x"}, "b": {"N": ""}}),
        Some(
            Key {
                hash_key_element: Attribute::string("a", "x"),
                range_key_element: None,
            }
        )
    )]
    #[case::mistyped_range(
        schema(true),
        json!({"a": {"S": "x"}, "b": {"S": "1"}}),
        Some(
            Key {
                hash_key_element: Attribute::string("a", "x"),
                range_key_element: None,
            }
        )
    )]
    #[case::missing_hash(schema(true), json!({"b": {"N": "1"}}), None)]
    #[case::mistyped_hash(schema(true), json!({"a": {"N": "1"}, "b": {"N": "1"}}), None)]
    #[case::set_hash(schema(false), json!({"a": {"SS": ["x"]}}), None)]
    fn test_parse_key(
        #[case] schema: KeySchema,
        #[case] wire: Value,
        #[case] expected: Option<Key>,
    ) {
        assert_eq!(schema.parse_key(wire.as_object().unwrap()), expected);
    }

    #[test]
    fn test_key_to_wire() {
        let key = schema(true).clone_with("x", Some("7"));
        assert_eq!(
            serde_json::to_value(key.to_wire()).unwrap(),
            json!({"a": {"S": "x"}, "b": {"N": "7"}})
        );
        assert_eq!(
            key.into_attributes(),
            vec![Attribute::string("a", "x"), Attribute::number("b", "7")]
        );
    }

    #[test]
    fn test_key_schema_deserialize() {
        let schema: KeySchema = serde_json::from_value(json!({
            "hash": {"name": "a", "type": "S"},
            "range": {"name": "b", "type": "N"},
        }))
        .unwrap();
        assert_eq!(schema, self::schema(true));
    }
}
