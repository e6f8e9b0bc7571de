//! Change request preview.
//!
//! Fetches a shop's offers and prints the change request the extension
//! would submit for a selection, using the default discount policy and the
//! countdown configured by `UPSELL_COUNTDOWN_SECONDS`.
//!
//! # Usage
//!
//! ```bash
//! upsell-cli changes --shop dark-roast.myshopify.com --variant 1 --subscription -q 2
//! ```

use serde_json::json;
use upsell_core::{
    Countdown, DiscountPolicy, Offer, PurchaseType, build_changes, format_countdown, size_options,
};

use upsell_server::config::countdown_from_env;

use super::{CommandError, fetch_offers};

/// What the buyer picked.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    /// Offer index.
    pub offer: usize,
    /// Variant index within the offer.
    pub variant: usize,
    /// Subscribe instead of buying once.
    pub subscription: bool,
    /// Quantity.
    pub quantity: u32,
}

impl Selection {
    const fn purchase_type(&self) -> PurchaseType {
        if self.subscription {
            PurchaseType::Subscription
        } else {
            PurchaseType::OneTime
        }
    }
}

/// Build the preview document for a selection.
fn preview(
    offers: &[Offer],
    selection: &Selection,
    countdown: Countdown,
) -> Result<serde_json::Value, String> {
    let offer = offers.get(selection.offer).ok_or_else(|| {
        format!(
            "offer index {} out of range ({} offers)",
            selection.offer,
            offers.len()
        )
    })?;

    let changes = build_changes(
        offer,
        selection.variant,
        selection.purchase_type(),
        selection.quantity,
        &DiscountPolicy::default(),
    )
    .map_err(|e| e.to_string())?;

    Ok(json!({
        "offer": offer.product_title,
        "sizes": size_options(offer),
        "changes": changes,
        "countdown": {
            "seconds": countdown.remaining(),
            "display": countdown.to_string(),
        },
    }))
}

/// Print the change request for a selection.
pub async fn run(shop: &str, selection: &Selection) -> Result<(), CommandError> {
    let offers = fetch_offers(shop).await?;
    let seconds = countdown_from_env()?;
    let document =
        preview(&offers, selection, Countdown::new(seconds)).map_err(CommandError::Selection)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&document)?);
        println!("Offer countdown starts at {}", format_countdown(seconds));
    }

    Ok(())
}
