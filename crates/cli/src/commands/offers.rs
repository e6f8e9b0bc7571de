//! Offer lookup command.
//!
//! # Usage
//!
//! ```bash
//! upsell-cli offers --shop dark-roast.myshopify.com
//! ```
//!
//! # Environment Variables
//!
//! - `UPSELL_DATABASE_URL` - `PostgreSQL` connection string
//! - `SHOPIFY_API_KEY`, `SHOPIFY_API_SECRET` - App credentials
//! - `SHOPIFY_API_VERSION` - Admin API version (optional)

use super::{CommandError, fetch_offers};

/// Print the offers a shop's checkout would receive, as JSON.
pub async fn run(shop: &str) -> Result<(), CommandError> {
    let offers = fetch_offers(shop).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&offers)?);
    }

    Ok(())
}
