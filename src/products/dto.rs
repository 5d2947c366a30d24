use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Body for creating or replacing a product listing. Optional fields reset
/// to null when omitted on update, matching full-replacement semantics.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product_title: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub condition: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub negotiable: bool,
    #[serde(default)]
    pub screen_size: Option<String>,
    #[serde(default)]
    pub merchant_id: Option<Uuid>,
    pub product_image_url: String,
}

/// Optional equality filters for listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub merchant_id: Option<Uuid>,
}
