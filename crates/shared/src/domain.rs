use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Server-assigned order identifier.
///
/// Backends disagree on whether ids travel as JSON numbers or strings, so the
/// client keeps them as opaque text and only re-emits a number when the text
/// is one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for OrderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(number) if number.to_string() == self.0 => serializer.serialize_i64(number),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(number) => Self(number.to_string()),
            RawId::Text(text) => Self(text),
        })
    }
}

/// The mutable part of an order: what create and update send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub product_name: String,
    pub quantity: u32,
    pub status: String,
}

impl OrderDraft {
    pub fn new(product_name: impl Into<String>, quantity: u32, status: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            status: status.into(),
        }
    }

    pub fn with_id(self, id: OrderId) -> Order {
        Order {
            id,
            product_name: self.product_name,
            quantity: self.quantity,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub product_name: String,
    pub quantity: u32,
    pub status: String,
}

impl Order {
    pub fn draft(&self) -> OrderDraft {
        OrderDraft {
            product_name: self.product_name.clone(),
            quantity: self.quantity,
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_accepts_numeric_and_text_json() {
        let numeric: Order = serde_json::from_str(
            r#"{"id":7,"productName":"Widget","quantity":3,"status":"Open"}"#,
        )
        .expect("numeric id");
        assert_eq!(numeric.id, OrderId::new("7"));

        let text: Order = serde_json::from_str(
            r#"{"id":"a-1","productName":"Widget","quantity":3,"status":"Open"}"#,
        )
        .expect("text id");
        assert_eq!(text.id.as_str(), "a-1");
    }

    #[test]
    fn numeric_order_id_serializes_as_number() {
        let order = OrderDraft::new("Widget", 2, "Open").with_id(OrderId::from(12));
        let value = serde_json::to_value(&order).expect("json");
        assert_eq!(value["id"], serde_json::json!(12));
        assert_eq!(value["productName"], "Widget");
    }

    #[test]
    fn draft_serializes_without_id() {
        let value = serde_json::to_value(OrderDraft::new("Gadget", 0, "New")).expect("json");
        assert!(value.get("id").is_none());
        assert_eq!(value["quantity"], 0);
    }
}
