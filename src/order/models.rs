use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Numeric order identifier as stored in `wp_wc_orders.id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(pub i64);

impl OrderId {
    /// Parse a user-supplied token. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(OrderId)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of `wp_wc_order_product_lookup`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LineItem {
    pub order_id: i64,
    pub product_id: i64,
    pub product_qty: Decimal,
    pub price: Decimal,
    pub customer_id: Option<i64>,
    pub vendor_id: Option<i64>,
}

/// The subset of `wp_wc_orders` the document needs.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct OrderMeta {
    pub contract_number: Option<String>,
}

/// A vendor or customer from `wp_users`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Party {
    #[sqlx(rename = "ID")]
    pub id: i64,
    pub display_name: Option<String>,
}

/// Outcome of a best-effort party lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PartyLookup {
    Found(Party),
    Absent,
    Failed,
}

impl PartyLookup {
    pub fn party(&self) -> Option<&Party> {
        match self {
            PartyLookup::Found(party) => Some(party),
            PartyLookup::Absent | PartyLookup::Failed => None,
        }
    }
}

/// Request body for `POST /api/generate-pdf`.
///
/// `orderId` may be sent either as a JSON number or a JSON string.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GeneratePdfRequest {
    #[serde(rename = "orderId", default)]
    #[schema(value_type = Option<String>, example = "1024")]
    pub order_id: Option<serde_json::Value>,
}

/// Query string for `GET /api/generate-pdf?orderId=...`.
#[derive(Debug, Default, Deserialize)]
pub struct GeneratePdfQuery {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// One rendered table row of the hand-over act.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemRow {
    pub number: usize,
    pub product_id: String,
    pub product_qty: String,
    pub price: String,
    pub total: String,
}

/// Fully resolved data for the order template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    pub order_id: String,
    pub contract_number: String,
    pub date: String,
    pub vendor_name: String,
    pub customer_name: String,
    pub items: Vec<LineItemRow>,
    pub total_amount: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_parse() {
        assert_eq!(OrderId::parse("42"), Some(OrderId(42)));
        assert_eq!(OrderId::parse("  9007199254740993 "), Some(OrderId(9007199254740993)));
        assert_eq!(OrderId::parse("12a"), None);
        assert_eq!(OrderId::parse("1.5"), None);
        assert_eq!(OrderId::parse(""), None);
    }

    #[test]
    fn test_party_lookup_only_found_yields_party() {
        let party = Party {
            id: 7,
            display_name: Some("Aziz".to_string()),
        };
        assert_eq!(PartyLookup::Found(party.clone()).party(), Some(&party));
        assert_eq!(PartyLookup::Absent.party(), None);
        assert_eq!(PartyLookup::Failed.party(), None);
    }

    #[test]
    fn test_document_serializes_template_keys() {
        let doc = OrderDocument {
            order_id: "5".into(),
            contract_number: "C-5".into(),
            date: "01.02.2026".into(),
            vendor_name: "N/A".into(),
            customer_name: "N/A".into(),
            items: vec![],
            total_amount: "0.00".into(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["orderId"], "5");
        assert_eq!(value["contractNumber"], "C-5");
        assert_eq!(value["vendorName"], "N/A");
        assert_eq!(value["totalAmount"], "0.00");
    }

    #[test]
    fn test_request_accepts_number_or_string() {
        let as_number: GeneratePdfRequest = serde_json::from_str(r#"{"orderId": 17}"#).unwrap();
        assert_eq!(as_number.order_id, Some(serde_json::json!(17)));

        let as_string: GeneratePdfRequest = serde_json::from_str(r#"{"orderId": "17"}"#).unwrap();
        assert_eq!(as_string.order_id, Some(serde_json::json!("17")));

        let missing: GeneratePdfRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.order_id.is_none());
    }
}
