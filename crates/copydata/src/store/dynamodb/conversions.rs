//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and the
//! generic item model. Testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use copydata_core::item::{Item, ItemKey, Value};
use copydata_core::storage::StoreError;

/// Convert a generic value to a DynamoDB attribute.
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::S(s) => AttributeValue::S(s.clone()),
        Value::N(n) => AttributeValue::N(n.clone()),
        Value::B(bytes) => AttributeValue::B(Blob::new(bytes.clone())),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Null => AttributeValue::Null(true),
        Value::L(values) => AttributeValue::L(values.iter().map(value_to_attribute).collect()),
        Value::M(map) => AttributeValue::M(item_to_attributes(map)),
        Value::Ss(values) => AttributeValue::Ss(values.clone()),
        Value::Ns(values) => AttributeValue::Ns(values.clone()),
        Value::Bs(values) => {
            AttributeValue::Bs(values.iter().map(|b| Blob::new(b.clone())).collect())
        }
    }
}

/// Convert a DynamoDB attribute to a generic value.
pub fn attribute_to_value(attribute: &AttributeValue) -> Result<Value, StoreError> {
    Ok(match attribute {
        AttributeValue::S(s) => Value::S(s.clone()),
        AttributeValue::N(n) => Value::N(n.clone()),
        AttributeValue::B(blob) => Value::B(blob.as_ref().to_vec()),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::L(
            values
                .iter()
                .map(attribute_to_value)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::M(attributes_to_item(map)?),
        AttributeValue::Ss(values) => Value::Ss(values.clone()),
        AttributeValue::Ns(values) => Value::Ns(values.clone()),
        AttributeValue::Bs(values) => {
            Value::Bs(values.iter().map(|b| b.as_ref().to_vec()).collect())
        }
        other => {
            return Err(StoreError::InvalidData(format!(
                "Unsupported attribute type: {:?}",
                other
            )))
        }
    })
}

/// Convert a generic item to a DynamoDB item.
pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), value_to_attribute(value)))
        .collect()
}

/// Convert a DynamoDB item to a generic item.
pub fn attributes_to_item(attributes: &HashMap<String, AttributeValue>) -> Result<Item, StoreError> {
    attributes
        .iter()
        .map(|(name, attribute)| Ok((name.clone(), attribute_to_value(attribute)?)))
        .collect()
}

/// Convert an item key to the key map of a DeleteItem request.
pub fn key_to_attributes(key: &ItemKey) -> HashMap<String, AttributeValue> {
    key.attributes()
        .iter()
        .map(|(name, value)| (name.clone(), value_to_attribute(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use copydata_core::item::KeySchema;

    fn expense() -> Item {
        let mut nested = HashMap::new();
        nested.insert("line".to_string(), Value::n(1));
        nested.insert("memo".to_string(), Value::Null);

        [
            ("expenseId".to_string(), Value::s("e-1")),
            ("amount".to_string(), Value::n("12.50")),
            ("receipt".to_string(), Value::B(vec![0xde, 0xad])),
            ("approved".to_string(), Value::Bool(false)),
            ("tags".to_string(), Value::Ss(vec!["travel".to_string()])),
            (
                "history".to_string(),
                Value::L(vec![Value::s("created"), Value::M(nested)]),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_item_survives_conversion() {
        let item = expense();

        let attributes = item_to_attributes(&item);
        let back = attributes_to_item(&attributes).unwrap();

        assert_eq!(back, item);
    }

    #[test]
    fn test_number_keeps_wire_representation() {
        assert_eq!(
            value_to_attribute(&Value::n("1.10")),
            AttributeValue::N("1.10".to_string())
        );
    }

    #[test]
    fn test_null_attribute_maps_to_null_value() {
        assert_eq!(
            attribute_to_value(&AttributeValue::Null(true)).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_key_to_attributes() {
        let key = KeySchema::partition("currencyPair")
            .extract(
                &[
                    ("currencyPair".to_string(), Value::s("GBP-EUR")),
                    ("rate".to_string(), Value::n("1.17")),
                ]
                .into_iter()
                .collect(),
            )
            .unwrap();

        let attributes = key_to_attributes(&key);

        assert_eq!(attributes.len(), 1);
        assert_eq!(
            attributes.get("currencyPair"),
            Some(&AttributeValue::S("GBP-EUR".to_string()))
        );
    }
}
