use crate::common::attribute::{Attribute, AttributeValue, Item};
use crate::{Error, Result};

use aws_sdk_dynamodb::{primitives::Blob, types};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Serialize, de::DeserializeOwned};
use std::collections;

/// An SDK attribute value of a type outside the supported set
/// (`BOOL`, `NULL`, `L`, `M`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("Unsupported attribute type")]
pub struct UnsupportedType;

fn decode_blob(payload: &str) -> Result<Blob> {
    Ok(Blob::new(STANDARD.decode(payload)?))
}

fn decode_blobs(payloads: &[String]) -> Result<Vec<Blob>> {
    payloads.iter().map(|payload| decode_blob(payload)).collect()
}

fn encode_blobs(blobs: &[Blob]) -> Vec<String> {
    blobs.iter().map(|blob| STANDARD.encode(blob.as_ref())).collect()
}

impl TryFrom<&AttributeValue> for types::AttributeValue {
    type Error = Error;

    fn try_from(value: &AttributeValue) -> Result<Self> {
        let value = match value {
            AttributeValue::String(value) => Self::S(value.clone()),
            AttributeValue::Number(value) => Self::N(value.clone()),
            AttributeValue::Binary(value) => Self::B(decode_blob(value)?),
            AttributeValue::StringSet(values) => Self::Ss(values.clone()),
            AttributeValue::NumberSet(values) => Self::Ns(values.clone()),
            AttributeValue::BinarySet(values) => Self::Bs(decode_blobs(values)?),
        };
        Ok(value)
    }
}

impl TryFrom<&types::AttributeValue> for AttributeValue {
    type Error = UnsupportedType;

    fn try_from(value: &types::AttributeValue) -> Result<Self, UnsupportedType> {
        let value = match value {
            types::AttributeValue::S(value) => Self::String(value.clone()),
            types::AttributeValue::N(value) => Self::Number(value.clone()),
            types::AttributeValue::B(blob) => Self::Binary(STANDARD.encode(blob.as_ref())),
            types::AttributeValue::Ss(values) => Self::StringSet(values.clone()),
            types::AttributeValue::Ns(values) => Self::NumberSet(values.clone()),
            types::AttributeValue::Bs(blobs) => Self::BinarySet(encode_blobs(blobs)),
            _ => return Err(UnsupportedType),
        };
        Ok(value)
    }
}

/// Serialize a typed value into attributes through `serde_dynamo`.
///
/// Fields must map onto the supported types: use `serde_dynamo::string_set`
/// and friends for set fields, and skip `None` fields.
///
/// ```rust
/// use dynamodb_rpc::common::{attribute::Attribute, convert};
///
/// #[derive(serde::Serialize)]
/// struct User {
///     id: String,
///     age: u32,
/// }
///
/// let mut attributes = convert::to_attributes(User { id: "1".to_string(), age: 42 }).unwrap();
/// attributes.sort_by(|a, b| a.name.cmp(&b.name));
/// assert_eq!(
///     attributes,
///     vec![Attribute::number("age", "42"), Attribute::string("id", "1")]
/// );
/// ```
pub fn to_attributes<T: Serialize>(value: T) -> Result<Vec<Attribute>> {
    let item: collections::HashMap<String, types::AttributeValue> = serde_dynamo::to_item(value)?;
    item.into_iter()
        .map(|(name, value)| match AttributeValue::try_from(&value) {
            Ok(value) => Ok(Attribute::new(name, value)),
            Err(UnsupportedType) => Err(Error::UnsupportedAttribute { name }),
        })
        .collect()
}

/// Deserialize a decoded item into a typed value through `serde_dynamo`.
pub fn from_item<T: DeserializeOwned>(item: &Item) -> Result<T> {
    let mut sdk_item = collections::HashMap::with_capacity(item.len());
    for (name, attribute) in item {
        sdk_item.insert(name.clone(), types::AttributeValue::try_from(&attribute.value)?);
    }
    let value = serde_dynamo::from_item(sdk_item)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde::Deserialize;

    #[rstest]
    #[case::string(
        AttributeValue::String("a".to_string()),
        types::AttributeValue::S("a".to_string())
    )]
    #[case::number(
        AttributeValue::Number("1".to_string()),
        types::AttributeValue::N("1".to_string())
    )]
    #[case::binary(
        AttributeValue::Binary("AAE=".to_string()),
        types::AttributeValue::B(Blob::new(vec![0, 1]))
    )]
    #[case::string_set(
        AttributeValue::StringSet(
            vec![
                "a".to_string(),
                "b".to_string(),
            ]
        ),
        types::AttributeValue::Ss(
            vec![
                "a".to_string(),
                "b".to_string(),
            ]
        )
    )]
    #[case::number_set(
        AttributeValue::NumberSet(
            vec![
                "1".to_string(),
            ]
        ),
        types::AttributeValue::Ns(
            vec![
                "1".to_string(),
            ]
        )
    )]
    #[case::binary_set(
        AttributeValue::BinarySet(
            vec![
                "AA==".to_string(),
            ]
        ),
        types::AttributeValue::Bs(
            vec![
                Blob::new(vec![0]),
            ]
        )
    )]
    fn test_sdk_conversion(#[case] value: AttributeValue, #[case] sdk: types::AttributeValue) {
        assert_eq!(types::AttributeValue::try_from(&value).unwrap(), sdk);
        assert_eq!(AttributeValue::try_from(&sdk), Ok(value));
    }

    #[test]
    fn test_invalid_binary() {
        let value = AttributeValue::Binary("not base64!".to_string());
        let actual = types::AttributeValue::try_from(&value);
        assert!(matches!(actual, Err(Error::Base64(_))));
    }

    #[test]
    fn test_unsupported_sdk_type() {
        assert_eq!(
            AttributeValue::try_from(&types::AttributeValue::Bool(true)),
            Err(UnsupportedType)
        );
    }

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct User {
        id: String,
        age: u32,
        #[serde(with = "serde_dynamo::string_set")]
        tags: Vec<String>,
    }

    #[test]
    fn test_typed_round_trip() {
        let user = User {
            id: "1".to_string(),
            age: 42,
            tags: vec!["x".to_string()],
        };
        let attributes = to_attributes(&user).unwrap();
        let item: Item = attributes
            .into_iter()
            .map(|attribute| (attribute.name.clone(), attribute))
            .collect();
        assert_eq!(item["tags"], Attribute::string_set("tags", ["x"]));
        let actual: User = from_item(&item).unwrap();
        assert_eq!(actual, user);
    }

    #[test]
    fn test_unsupported_field() {
        #[derive(Serialize)]
        struct Flagged {
            flag: bool,
        }
        let actual = to_attributes(Flagged { flag: true });
        assert!(matches!(actual, Err(Error::UnsupportedAttribute { name }) if name == "flag"));
    }
}
