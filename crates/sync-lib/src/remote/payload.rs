//! Mapping from catalog records to the remote product shape

use crate::models::ProductRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPrice {
    /// Price in the currency's minor units (cents for USD, yen for JPY).
    /// Prices beyond the `i64` range saturate.
    pub amount: i64,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductIdentifiers {
    pub sku: String,
    #[serde(rename = "type")]
    pub type_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub reference_id: String,
    pub title: String,
    pub price: ProductPrice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_reference_id: Option<String>,
    pub identifiers: ProductIdentifiers,
}

impl From<&ProductRecord> for ProductPayload {
    fn from(product: &ProductRecord) -> Self {
        Self {
            reference_id: product.sku.clone(),
            title: product.name.clone(),
            price: ProductPrice {
                amount: to_minor_units(product.price, &product.currency),
                currency_code: product.currency.clone(),
            },
            category: product.category.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            parent_reference_id: product.parent_sku.clone(),
            identifiers: ProductIdentifiers {
                sku: product.sku.clone(),
                type_id: product.type_id.clone(),
            },
        }
    }
}

/// ISO 4217 minor unit exponent; two decimals unless listed
fn minor_unit_exponent(currency: &str) -> i32 {
    match currency.to_ascii_uppercase().as_str() {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX"
        | "UYI" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

fn to_minor_units(price: f64, currency: &str) -> i64 {
    (price * 10f64.powi(minor_unit_exponent(currency))).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_payload_shape() {
        let product = ProductRecord {
            id: 7,
            sku: "TV-55".to_string(),
            name: "55\" Television".to_string(),
            price: 499.99,
            currency: "USD".to_string(),
            store_ids: vec![1],
            updated_at: Utc::now(),
            type_id: "simple".to_string(),
            category: Some("Electronics".to_string()),
            description: None,
            image_url: None,
            parent_sku: Some("TV".to_string()),
        };

        let json = serde_json::to_value(ProductPayload::from(&product)).unwrap();

        assert_eq!(json["referenceId"], "TV-55");
        assert_eq!(json["title"], "55\" Television");
        assert_eq!(json["price"]["amount"], 49999);
        assert_eq!(json["price"]["currencyCode"], "USD");
        assert_eq!(json["category"], "Electronics");
        assert_eq!(json["parentReferenceId"], "TV");
        assert_eq!(json["identifiers"]["type"], "simple");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_minor_units_follow_currency() {
        assert_eq!(to_minor_units(19.99, "USD"), 1999);
        assert_eq!(to_minor_units(1500.0, "JPY"), 1500);
        assert_eq!(to_minor_units(1500.0, "jpy"), 1500);
        assert_eq!(to_minor_units(2.5, "KWD"), 2500);
        assert_eq!(to_minor_units(1e300, "USD"), i64::MAX);
    }
}
