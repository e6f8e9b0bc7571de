//! Post-purchase offer types.
//!
//! These are the flattened shapes handed to the post-purchase extension.
//! Field names on the wire follow what the extension reads
//! (`productImageURL`, `variantID`, ...), so serde renames are explicit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, SellingPlanId, VariantId};

/// A product option selected by a variant, e.g. `Size: Large`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g. "Size").
    pub name: String,
    /// Option value (e.g. "Large").
    pub value: String,
}

impl SelectedOption {
    /// Create a new selected option.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A purchasable variant of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Legacy variant id, as used by changeset `variantId`.
    #[serde(rename = "variantID")]
    pub variant_id: VariantId,
    /// Options in the order Shopify returns them.
    pub selected_options: Vec<SelectedOption>,
    /// Subscription plan for this variant, if it belongs to a plan group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_plan_id: Option<SellingPlanId>,
    /// Unit price, with the scale Shopify returned.
    pub price: Decimal,
}

impl Variant {
    /// Value of the option called `name`, if the variant has one.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.selected_options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }

    /// Whether the variant can be bought as a subscription.
    #[must_use]
    pub const fn is_subscribable(&self) -> bool {
        self.selling_plan_id.is_some()
    }
}

/// A product presented to the buyer after checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Legacy product id.
    pub id: ProductId,
    /// Offer title.
    pub title: String,
    /// Product title shown as the heading.
    pub product_title: String,
    /// Featured image URL.
    #[serde(rename = "productImageURL")]
    pub image_url: Option<String>,
    /// Plain text product description.
    #[serde(rename = "productDescription")]
    pub description: String,
    /// Price of the first variant, or zero when there are none.
    pub original_price: Decimal,
    /// Variants in the order Shopify returns them.
    pub variants: Vec<Variant>,
}

impl Offer {
    /// Build an offer, deriving `original_price` from the first variant.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: String,
        image_url: Option<String>,
        description: String,
        variants: Vec<Variant>,
    ) -> Self {
        let original_price = variants.first().map_or(Decimal::ZERO, |v| v.price);

        Self {
            id,
            product_title: title.clone(),
            title,
            image_url,
            description,
            original_price,
            variants,
        }
    }
}

/// Payload returned by the offer endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferResponse {
    /// Offers to present, at most two.
    pub offers: Vec<Offer>,
    /// Countdown duration in seconds.
    pub time: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn variant(id: &str, price: &str, plan: Option<&str>) -> Variant {
        Variant {
            variant_id: VariantId::new(id),
            selected_options: vec![SelectedOption::new("Size", "Small")],
            selling_plan_id: plan.map(SellingPlanId::new),
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn test_original_price_from_first_variant() {
        let offer = Offer::new(
            ProductId::new("1"),
            "Coffee".to_string(),
            None,
            String::new(),
            vec![variant("10", "10.00", None), variant("11", "12.00", None)],
        );
        assert_eq!(offer.original_price.to_string(), "10.00");
        assert_eq!(offer.product_title, "Coffee");
    }

    #[test]
    fn test_original_price_defaults_to_zero() {
        let offer = Offer::new(
            ProductId::new("1"),
            "Mug".to_string(),
            None,
            String::new(),
            vec![],
        );
        assert_eq!(offer.original_price, Decimal::ZERO);
        assert_eq!(serde_json::to_value(&offer).unwrap()["originalPrice"], json!("0"));
    }

    #[test]
    fn test_wire_format() {
        let offer = Offer::new(
            ProductId::new("123"),
            "Coffee".to_string(),
            Some("https://cdn.example.com/a.jpg".to_string()),
            "Dark roast".to_string(),
            vec![variant("456", "10.00", Some("789")), variant("457", "12.00", None)],
        );

        let value = serde_json::to_value(&offer).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "123",
                "title": "Coffee",
                "productTitle": "Coffee",
                "productImageURL": "https://cdn.example.com/a.jpg",
                "productDescription": "Dark roast",
                "originalPrice": "10.00",
                "variants": [
                    {
                        "variantID": "456",
                        "selectedOptions": [{"name": "Size", "value": "Small"}],
                        "sellingPlanId": "789",
                        "price": "10.00"
                    },
                    {
                        "variantID": "457",
                        "selectedOptions": [{"name": "Size", "value": "Small"}],
                        "price": "12.00"
                    }
                ]
            })
        );
    }

    #[test]
    fn test_missing_image_serializes_as_null() {
        let offer = Offer::new(
            ProductId::new("1"),
            "Mug".to_string(),
            None,
            String::new(),
            vec![],
        );
        let value = serde_json::to_value(&offer).unwrap();
        assert!(value["productImageURL"].is_null());
    }

    #[test]
    fn test_option_value() {
        let v = variant("1", "1.00", None);
        assert_eq!(v.option_value("Size"), Some("Small"));
        assert_eq!(v.option_value("Color"), None);
        assert!(!v.is_subscribable());
    }
}
