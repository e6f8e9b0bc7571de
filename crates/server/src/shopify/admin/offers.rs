//! Offer lookups for the post-purchase extension.

use secrecy::SecretString;
use tracing::instrument;
use upsell_core::{Offer, ShopDomain};

use super::{
    AdminClient, AdminShopifyError, conversions::convert_offers, queries::GetOffers,
    queries::get_offers,
};
use crate::shopify::OfferError;

impl AdminClient {
    /// Fetch the offers presented after checkout.
    ///
    /// Runs one fixed query (first 2 products, up to 5 variants each, one
    /// selling plan per variant) and flattens the result.
    ///
    /// # Arguments
    ///
    /// * `access_token` - Offline Admin API token stored for `shop`
    /// * `shop` - Shop the request came from
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::FetchFailed`] for any transport, GraphQL or
    /// conversion failure. The cause is logged, not returned.
    #[instrument(skip(self, access_token), fields(shop = %shop))]
    pub async fn get_offers(
        &self,
        access_token: &SecretString,
        shop: &ShopDomain,
    ) -> Result<Vec<Offer>, OfferError> {
        match self.fetch_offers(access_token, shop).await {
            Ok(offers) => {
                tracing::debug!(count = offers.len(), "Fetched offers");
                Ok(offers)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching offers");
                Err(OfferError::FetchFailed)
            }
        }
    }

    async fn fetch_offers(
        &self,
        access_token: &SecretString,
        shop: &ShopDomain,
    ) -> Result<Vec<Offer>, AdminShopifyError> {
        let response = self
            .execute::<GetOffers>(shop, access_token, get_offers::Variables)
            .await?;

        convert_offers(response)
    }
}
