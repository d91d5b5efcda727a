use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};
use std::{collections, fmt};

/// A decoded item: attribute name to attribute.
pub type Item = collections::HashMap<String, Attribute>;

/// The closed set of attribute types carried on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttributeType {
    /// `S`
    String,
    /// `N`, transmitted as a decimal string.
    Number,
    /// `B`, transmitted as a base64 string.
    Binary,
    /// `SS`
    StringSet,
    /// `NS`
    NumberSet,
    /// `BS`
    BinarySet,
}

impl AttributeType {
    /// Tag order tried when decoding a wire value.
    pub const DECODE_ORDER: [Self; 6] = [
        Self::String,
        Self::Number,
        Self::Binary,
        Self::StringSet,
        Self::NumberSet,
        Self::BinarySet,
    ];

    /// The wire tag of this type.
    pub fn tag(self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
            Self::StringSet => "SS",
            Self::NumberSet => "NS",
            Self::BinarySet => "BS",
        }
    }

    /// Whether values of this type hold a list of members.
    pub fn is_set(self) -> bool {
        matches!(self, Self::StringSet | Self::NumberSet | Self::BinarySet)
    }

    fn try_decode(self, object: &Map<String, Value>) -> Option<AttributeValue> {
        let payload = object.get(self.tag())?;
        let value = match self {
            Self::String => AttributeValue::String(payload.as_str()?.to_string()),
            Self::Number => AttributeValue::Number(payload.as_str()?.to_string()),
            Self::Binary => AttributeValue::Binary(payload.as_str()?.to_string()),
            Self::StringSet => AttributeValue::StringSet(decode_members(payload)?),
            Self::NumberSet => AttributeValue::NumberSet(decode_members(payload)?),
            Self::BinarySet => AttributeValue::BinarySet(decode_members(payload)?),
        };
        Some(value)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn decode_members(payload: &Value) -> Option<Vec<String>> {
    payload
        .as_array()?
        .iter()
        .map(|member| member.as_str().map(str::to_string))
        .collect()
}

/// A typed attribute value.
///
/// Numbers and binaries keep their wire string form so no precision is lost.
///
/// ```rust
/// use dynamodb_rpc::common::attribute::AttributeValue;
///
/// let value = AttributeValue::NumberSet(vec!["1".to_string(), "2.5".to_string()]);
/// assert_eq!(value.encode(), serde_json::json!({"NS": ["1", "2.5"]}));
/// assert_eq!(AttributeValue::decode(&value.encode()), Some(value));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AttributeValue {
    /// A string.
    String(String),
    /// A decimal number.
    Number(String),
    /// A base64 encoded binary.
    Binary(String),
    /// A set of strings, in caller order.
    StringSet(Vec<String>),
    /// A set of decimal numbers, in caller order.
    NumberSet(Vec<String>),
    /// A set of base64 encoded binaries, in caller order.
    BinarySet(Vec<String>),
}

impl AttributeValue {
    /// The type of this value.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::String(_) => AttributeType::String,
            Self::Number(_) => AttributeType::Number,
            Self::Binary(_) => AttributeType::Binary,
            Self::StringSet(_) => AttributeType::StringSet,
            Self::NumberSet(_) => AttributeType::NumberSet,
            Self::BinarySet(_) => AttributeType::BinarySet,
        }
    }

    /// The scalar payload, if this is not a set.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) | Self::Number(value) | Self::Binary(value) => Some(value),
            _ => None,
        }
    }

    /// The set members, if this is a set.
    pub fn as_set(&self) -> Option<&[String]> {
        match self {
            Self::StringSet(values) | Self::NumberSet(values) | Self::BinarySet(values) => {
                Some(values)
            }
            _ => None,
        }
    }

    /// Encode into the `{ "<tag>": payload }` wire form.
    pub fn encode(&self) -> Value {
        let payload = match self {
            Self::String(value) | Self::Number(value) | Self::Binary(value) => {
                Value::String(value.clone())
            }
            Self::StringSet(values) | Self::NumberSet(values) | Self::BinarySet(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        };
        let mut object = Map::with_capacity(1);
        object.insert(self.attribute_type().tag().to_string(), payload);
        Value::Object(object)
    }

    /// Decode a wire value, probing tags in [`AttributeType::DECODE_ORDER`].
    ///
    /// Returns `None` when no known tag carries a payload of the right shape.
    pub fn decode(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        AttributeType::DECODE_ORDER
            .into_iter()
            .find_map(|attribute_type| attribute_type.try_decode(object))
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let tag = self.attribute_type().tag();
        match self {
            Self::String(value) | Self::Number(value) | Self::Binary(value) => {
                map.serialize_entry(tag, value)?
            }
            Self::StringSet(values) | Self::NumberSet(values) | Self::BinarySet(values) => {
                map.serialize_entry(tag, values)?
            }
        }
        map.end()
    }
}

/// A named attribute.
///
/// ```rust
/// use dynamodb_rpc::common::attribute::Attribute;
///
/// let attribute = Attribute::number("age", "42");
/// assert_eq!(attribute.value.as_str(), Some("42"));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Attribute {
    /// The attribute name (wire field key).
    pub name: String,
    /// The typed value.
    pub value: AttributeValue,
}

impl Attribute {
    /// Create an attribute from a name and a value.
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// A string attribute.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::String(value.into()))
    }

    /// A number attribute, given as a decimal string.
    pub fn number(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::Number(value.into()))
    }

    /// A binary attribute, given as a base64 string.
    pub fn binary(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::Binary(value.into()))
    }

    /// A string set attribute.
    pub fn string_set<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            AttributeValue::StringSet(values.into_iter().map(Into::into).collect()),
        )
    }

    /// A number set attribute.
    pub fn number_set<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            AttributeValue::NumberSet(values.into_iter().map(Into::into).collect()),
        )
    }

    /// A binary set attribute.
    pub fn binary_set<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            AttributeValue::BinarySet(values.into_iter().map(Into::into).collect()),
        )
    }

    /// The type of the value.
    pub fn attribute_type(&self) -> AttributeType {
        self.value.attribute_type()
    }

    /// Encode the value into its wire form; the name becomes the enclosing key.
    pub fn encode(&self) -> Value {
        self.value.encode()
    }

    /// Decode a named wire value.
    pub fn decode(name: impl Into<String>, value: &Value) -> Option<Self> {
        AttributeValue::decode(value).map(|value| Self::new(name, value))
    }
}

/// Decode every field of a wire item, dropping fields of unknown shape.
pub fn decode_item(object: &Map<String, Value>) -> Item {
    let mut item = Item::with_capacity(object.len());
    for (name, value) in object {
        match Attribute::decode(name.as_str(), value) {
            Some(attribute) => {
                item.insert(name.clone(), attribute);
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    attribute = %name,
                    value = %value,
                    "dropping attribute of unknown type"
                );
            }
        }
    }
    item
}

/// Encode attributes into the wire item form, in the order given.
pub(crate) fn encode_attributes<'a>(
    attributes: impl IntoIterator<Item = &'a Attribute>,
) -> indexmap::IndexMap<String, AttributeValue> {
    attributes
        .into_iter()
        .map(|attribute| (attribute.name.clone(), attribute.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::string(AttributeValue::String("a".to_string()), json!({"S": "a"}))]
    #[case::number(AttributeValue::Number("-1.50".to_string()), json!({"N": "-1.50"}))]
    #[case::binary(AttributeValue::Binary("AAE=".to_string()), json!({"B": "AAE="}))]
    #[case::string_set_single(
        AttributeValue::StringSet(
            vec![
                "a".to_string(),
            ]
        ),
        json!({"SS": ["a"]})
    )]
    #[case::string_set_multiple(
        AttributeValue::StringSet(
            vec![
                "b".to_string(),
                "a".to_string(),
                "b".to_string(),
            ]
        ),
        json!({"SS": ["b", "a", "b"]})
    )]
    #[case::number_set_single(
        AttributeValue::NumberSet(
            vec![
                "1".to_string(),
            ]
        ),
        json!({"NS": ["1"]})
    )]
    #[case::number_set_multiple(
        AttributeValue::NumberSet(
            vec![
                "1".to_string(),
                "12345678901234567890.1".to_string(),
            ]
        ),
        json!({"NS": ["1", "12345678901234567890.1"]})
    )]
    #[case::binary_set_single(
        AttributeValue::BinarySet(
            vec![
                "AA==".to_string(),
            ]
        ),
        json!({"BS": ["AA=="]})
    )]
    #[case::binary_set_multiple(
        AttributeValue::BinarySet(
            vec![
                "AA==".to_string(),
                "AQ==".to_string(),
            ]
        ),
        json!({"BS": ["AA==", "AQ=="]})
    )]
    fn test_attribute_value_wire_form(#[case] value: AttributeValue, #[case] wire: Value) {
        assert_eq!(value.encode(), wire);
        assert_eq!(serde_json::to_value(&value).unwrap(), wire);
        assert_eq!(AttributeValue::decode(&wire), Some(value));
    }

    #[rstest]
    #[case::string_before_number(
        json!({"N": "1", "S": "a"}),
        AttributeValue::String("a".to_string())
    )]
    #[case::number_before_binary(
        json!({"B": "AA==", "N": "1"}),
        AttributeValue::Number("1".to_string())
    )]
    #[case::wrong_shape_falls_through(
        json!({"S": 1, "SS": ["a"]}),
        AttributeValue::StringSet(
            vec![
                "a".to_string(),
            ]
        )
    )]
    #[case::scalar_before_set(
        json!({"NS": ["1"], "B": "AA=="}),
        AttributeValue::Binary("AA==".to_string())
    )]
    fn test_decode_priority(#[case] wire: Value, #[case] expected: AttributeValue) {
        assert_eq!(AttributeValue::decode(&wire), Some(expected));
    }

    #[rstest]
    #[case::unknown_tag(json!({"BOOL": true}))]
    #[case::wrong_type(json!({"N": 1}))]
    #[case::set_with_non_string_member(json!({"NS": ["1", 2]}))]
    #[case::not_an_object(json!("S"))]
    #[case::empty_object(json!({}))]
    fn test_decode_unknown(#[case] wire: Value) {
        assert_eq!(AttributeValue::decode(&wire), None);
    }

    #[test]
    fn test_decode_item_drops_unknown_fields() {
        let wire = json!({
            "id": {"S": "1"},
            "flag": {"BOOL": true},
            "tags": {"SS": ["x", "y"]},
        });
        let actual = decode_item(wire.as_object().unwrap());
        let expected = Item::from([
            ("id".to_string(), Attribute::string("id", "1")),
            ("tags".to_string(), Attribute::string_set("tags", ["x", "y"])),
        ]);
        assert_eq!(actual, expected);
    }

    #[cfg(feature = "tracing")]
    #[test]
    #[tracing_test::traced_test]
    fn test_decode_item_logs_dropped_fields() {
        let wire = json!({"id": {"S": "1"}, "nested": {"M": {}}});
        let actual = decode_item(wire.as_object().unwrap());
        assert_eq!(actual.len(), 1);
        assert!(logs_contain("dropping attribute of unknown type"));
        assert!(logs_contain("nested"));
    }

    #[test]
    fn test_decode_item_empty() {
        assert!(decode_item(&Map::new()).is_empty());
    }

    #[test]
    fn test_encode_attributes_keeps_order() {
        let attributes = [Attribute::string("b", "1"), Attribute::number("a", "2")];
        let encoded = encode_attributes(&attributes);
        let names: Vec<_> = encoded.keys().cloned().collect();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_attribute_accessors() {
        let attribute = Attribute::number_set("n", ["1", "2"]);
        assert_eq!(attribute.attribute_type(), AttributeType::NumberSet);
        assert!(attribute.attribute_type().is_set());
        assert_eq!(attribute.value.as_str(), None);
        assert_eq!(
            attribute.value.as_set(),
            Some(&["1".to_string(), "2".to_string()][..])
        );
    }
}
