//! Type conversions from the `GetOffers` response to offer types.
//!
//! The response nests everything in connection `edges { node }` wrappers;
//! offers are the flat shape the extension renders.

use std::str::FromStr;

use rust_decimal::Decimal;
use upsell_core::{
    GID_PREFIX, Offer, ProductId, SelectedOption, SellingPlanId, Variant, VariantId,
};

use super::super::AdminShopifyError;
use super::queries::get_offers;

type ProductNode = get_offers::GetOffersProductsEdgesNode;
type VariantNode = get_offers::GetOffersProductsEdgesNodeVariantsEdgesNode;
type SellingPlanGroups = get_offers::GetOffersProductsEdgesNodeVariantsEdgesNodeSellingPlanGroups;

pub fn convert_offers(data: get_offers::ResponseData) -> Result<Vec<Offer>, AdminShopifyError> {
    data.products
        .edges
        .into_iter()
        .map(|e| convert_offer(e.node))
        .collect()
}

fn convert_offer(product: ProductNode) -> Result<Offer, AdminShopifyError> {
    let variants = product
        .variants
        .edges
        .into_iter()
        .map(|e| convert_variant(e.node))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Offer::new(
        ProductId::new(product.legacy_resource_id),
        product.title,
        product.featured_image.map(|i| i.url),
        product.description,
        variants,
    ))
}

fn convert_variant(v: VariantNode) -> Result<Variant, AdminShopifyError> {
    let price = Decimal::from_str(&v.price).map_err(|_| AdminShopifyError::InvalidMoney(v.price))?;

    Ok(Variant {
        variant_id: VariantId::new(v.legacy_resource_id),
        selected_options: v
            .selected_options
            .into_iter()
            .map(|o| SelectedOption::new(o.name, o.value))
            .collect(),
        selling_plan_id: first_selling_plan(v.selling_plan_groups),
        price,
    })
}

/// First plan of the first plan group, with the gid prefix stripped.
///
/// Only the prefix is removed; whatever follows it is kept verbatim, and an
/// id that is not a selling plan gid is passed through unchanged.
fn first_selling_plan(groups: SellingPlanGroups) -> Option<SellingPlanId> {
    let group = groups.edges.into_iter().next()?.node;
    let plan = group.selling_plans.edges.into_iter().next()?.node;

    let prefix = format!("{GID_PREFIX}{}/", SellingPlanId::RESOURCE);
    let id = plan
        .id
        .strip_prefix(prefix.as_str())
        .map_or_else(|| plan.id.clone(), str::to_string);
    Some(SellingPlanId::new(id))
}
