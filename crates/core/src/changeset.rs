//! Post-purchase change requests.
//!
//! The extension never edits an order itself: it describes the line item it
//! wants to add and hands that description to the checkout host, which
//! calculates the new totals and later applies the signed changeset. This
//! module builds that description from an [`Offer`] and the buyer's choices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Offer, SellingPlanId, VariantId};

/// Largest quantity the buyer can pick.
pub const MAX_QUANTITY: u32 = 5;

/// Option name used to label variants in the size picker.
pub const SIZE_OPTION: &str = "Size";

/// Errors raised while building a change request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangesetError {
    /// The selected variant index does not exist on the offer.
    #[error("variant {index} out of range (offer has {len} variants)")]
    VariantOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of variants on the offer.
        len: usize,
    },

    /// Quantity outside `1..=MAX_QUANTITY`.
    #[error("quantity must be between 1 and {MAX_QUANTITY}, got {0}")]
    InvalidQuantity(u32),

    /// Subscription requested for a variant without a selling plan.
    #[error("variant {0} has no selling plan")]
    NotSubscribable(VariantId),
}

/// How the buyer wants to purchase the upsell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseType {
    /// Single purchase added to the existing order.
    #[default]
    OneTime,
    /// Recurring purchase under the variant's selling plan.
    Subscription,
}

/// Discount applied to an added line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    /// Discount amount, interpreted according to `value_type`.
    pub value: u32,
    /// Always `percentage` for upsells.
    pub value_type: DiscountValueType,
    /// Label shown to the buyer.
    pub title: String,
}

impl Discount {
    /// A percentage discount titled `Save N%`.
    #[must_use]
    pub fn percentage(value: u32) -> Self {
        Self {
            value,
            value_type: DiscountValueType::Percentage,
            title: format!("Save {value}%"),
        }
    }
}

/// Kind of discount value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountValueType {
    /// Percentage of the line price.
    Percentage,
    /// Fixed amount off the line price.
    FixedAmount,
}

/// Shipping line attached to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    /// Internal title.
    pub title: String,
    /// Title shown to the buyer.
    pub presentment_title: String,
}

impl Default for ShippingOption {
    fn default() -> Self {
        Self {
            title: "Subscription shipping line".to_string(),
            presentment_title: "Subscription shipping line".to_string(),
        }
    }
}

/// A single change submitted to the checkout host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Change {
    /// Add a one-time line item.
    AddVariant {
        /// Variant to add.
        variant_id: VariantId,
        /// Units to add.
        quantity: u32,
        /// Discount on the added line.
        discount: Discount,
    },
    /// Add a subscription line item.
    AddSubscription {
        /// Variant to subscribe to.
        variant_id: VariantId,
        /// Units per delivery.
        quantity: u32,
        /// Plan governing the deliveries.
        selling_plan_id: SellingPlanId,
        /// Shipping charged on the first delivery.
        #[serde(with = "rust_decimal::serde::float")]
        initial_shipping_price: Decimal,
        /// Shipping charged on each renewal.
        #[serde(with = "rust_decimal::serde::float")]
        recurring_shipping_price: Decimal,
        /// Discount on the added line.
        discount: Discount,
        /// Shipping line shown to the buyer.
        shipping_option: ShippingOption,
    },
}

/// Discounts and shipping applied to upsells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPolicy {
    /// Percentage off a one-time purchase.
    pub one_time_percent: u32,
    /// Percentage off a subscription.
    pub subscription_percent: u32,
    /// Initial and recurring shipping price for subscriptions.
    pub shipping_price: Decimal,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self {
            one_time_percent: 50,
            subscription_percent: 20,
            shipping_price: Decimal::TEN,
        }
    }
}

impl DiscountPolicy {
    /// Percentage applied for the given purchase type.
    #[must_use]
    pub const fn percent_for(&self, purchase_type: PurchaseType) -> u32 {
        match purchase_type {
            PurchaseType::OneTime => self.one_time_percent,
            PurchaseType::Subscription => self.subscription_percent,
        }
    }
}

/// Build the change list for the buyer's selection.
///
/// # Errors
///
/// Returns [`ChangesetError`] if `variant_index` is out of range, `quantity`
/// is outside `1..=MAX_QUANTITY`, or a subscription is requested on a
/// variant that has no selling plan.
pub fn build_changes(
    offer: &Offer,
    variant_index: usize,
    purchase_type: PurchaseType,
    quantity: u32,
    policy: &DiscountPolicy,
) -> Result<Vec<Change>, ChangesetError> {
    let variant = offer
        .variants
        .get(variant_index)
        .ok_or(ChangesetError::VariantOutOfRange {
            index: variant_index,
            len: offer.variants.len(),
        })?;

    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(ChangesetError::InvalidQuantity(quantity));
    }

    let discount = Discount::percentage(policy.percent_for(purchase_type));

    let change = match purchase_type {
        PurchaseType::OneTime => Change::AddVariant {
            variant_id: variant.variant_id.clone(),
            quantity,
            discount,
        },
        PurchaseType::Subscription => {
            let selling_plan_id = variant
                .selling_plan_id
                .clone()
                .ok_or_else(|| ChangesetError::NotSubscribable(variant.variant_id.clone()))?;

            Change::AddSubscription {
                variant_id: variant.variant_id.clone(),
                quantity,
                selling_plan_id,
                initial_shipping_price: policy.shipping_price,
                recurring_shipping_price: policy.shipping_price,
                discount,
                shipping_option: ShippingOption::default(),
            }
        }
    };

    Ok(vec![change])
}

/// One entry of the size picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeOption {
    /// Index into `offer.variants`.
    pub value: usize,
    /// Label shown to the buyer.
    pub label: String,
}

/// Picker entries for an offer's variants.
///
/// Labels use the `Size` option; variants without one fall back to their
/// option values joined with ` / `.
#[must_use]
pub fn size_options(offer: &Offer) -> Vec<SizeOption> {
    offer
        .variants
        .iter()
        .enumerate()
        .map(|(value, variant)| {
            let label = variant.option_value(SIZE_OPTION).map_or_else(
                || {
                    variant
                        .selected_options
                        .iter()
                        .map(|o| o.value.as_str())
                        .collect::<Vec<_>>()
                        .join(" / ")
                },
                str::to_string,
            );
            SizeOption { value, label }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;
    use crate::types::{ProductId, SelectedOption, Variant};

    fn offer() -> Offer {
        Offer::new(
            ProductId::new("1"),
            "Dark Roast Duo".to_string(),
            None,
            String::new(),
            vec![
                Variant {
                    variant_id: VariantId::new("10"),
                    selected_options: vec![SelectedOption::new("Size", "250g")],
                    selling_plan_id: Some(SellingPlanId::new("99")),
                    price: Decimal::from_str("10.00").unwrap(),
                },
                Variant {
                    variant_id: VariantId::new("11"),
                    selected_options: vec![
                        SelectedOption::new("Grind", "Whole"),
                        SelectedOption::new("Roast", "Dark"),
                    ],
                    selling_plan_id: None,
                    price: Decimal::from_str("12.00").unwrap(),
                },
            ],
        )
    }

    #[test]
    fn test_one_time_change() {
        let changes =
            build_changes(&offer(), 0, PurchaseType::OneTime, 2, &DiscountPolicy::default())
                .unwrap();

        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!([{
                "type": "add_variant",
                "variantId": "10",
                "quantity": 2,
                "discount": {"value": 50, "valueType": "percentage", "title": "Save 50%"}
            }])
        );
    }

    #[test]
    fn test_subscription_change() {
        let changes = build_changes(
            &offer(),
            0,
            PurchaseType::Subscription,
            1,
            &DiscountPolicy::default(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!([{
                "type": "add_subscription",
                "variantId": "10",
                "quantity": 1,
                "sellingPlanId": "99",
                "initialShippingPrice": 10.0,
                "recurringShippingPrice": 10.0,
                "discount": {"value": 20, "valueType": "percentage", "title": "Save 20%"},
                "shippingOption": {
                    "title": "Subscription shipping line",
                    "presentmentTitle": "Subscription shipping line"
                }
            }])
        );
    }

    #[test]
    fn test_subscription_requires_selling_plan() {
        let err = build_changes(
            &offer(),
            1,
            PurchaseType::Subscription,
            1,
            &DiscountPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err, ChangesetError::NotSubscribable(VariantId::new("11")));
    }

    #[test]
    fn test_variant_out_of_range() {
        let err = build_changes(&offer(), 2, PurchaseType::OneTime, 1, &DiscountPolicy::default())
            .unwrap_err();
        assert_eq!(err, ChangesetError::VariantOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn test_quantity_bounds() {
        let policy = DiscountPolicy::default();
        assert_eq!(
            build_changes(&offer(), 0, PurchaseType::OneTime, 0, &policy).unwrap_err(),
            ChangesetError::InvalidQuantity(0)
        );
        assert_eq!(
            build_changes(&offer(), 0, PurchaseType::OneTime, 6, &policy).unwrap_err(),
            ChangesetError::InvalidQuantity(6)
        );
        assert!(build_changes(&offer(), 0, PurchaseType::OneTime, MAX_QUANTITY, &policy).is_ok());
    }

    #[test]
    fn test_custom_policy() {
        let policy = DiscountPolicy {
            one_time_percent: 30,
            ..DiscountPolicy::default()
        };
        let changes = build_changes(&offer(), 0, PurchaseType::OneTime, 1, &policy).unwrap();
        let Change::AddVariant { discount, .. } = &changes[0] else {
            panic!("expected add_variant");
        };
        assert_eq!(discount.title, "Save 30%");
    }

    #[test]
    fn test_size_options() {
        let options = size_options(&offer());
        assert_eq!(
            options,
            vec![
                SizeOption {
                    value: 0,
                    label: "250g".to_string()
                },
                SizeOption {
                    value: 1,
                    label: "Whole / Dark".to_string()
                },
            ]
        );
    }
}
