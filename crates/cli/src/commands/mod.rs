//! CLI command implementations.

pub mod changes;
pub mod migrate;
pub mod offers;

use std::sync::Arc;

use thiserror::Error;
use upsell_core::{Offer, ShopDomain, ShopDomainError};
use upsell_server::config::{ConfigError, ShopifyAppConfig, get_database_url};
use upsell_server::db::{self, PgSessionStore, RepositoryError, SessionStore};
use upsell_server::shopify::{AdminClient, OfferError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session lookup failed.
    #[error("Session lookup failed: {0}")]
    Repository(#[from] RepositoryError),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid shop domain.
    #[error("Invalid shop: {0}")]
    InvalidShop(#[from] ShopDomainError),

    /// No stored session for the shop.
    #[error("No stored session for {0}. Install the app on the shop first.")]
    NoSession(ShopDomain),

    /// Offer fetch failed.
    #[error(transparent)]
    Offers(#[from] OfferError),

    /// The selection does not match the shop's offers.
    #[error("Invalid selection: {0}")]
    Selection(String),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Look up the shop's stored session and fetch its offers.
async fn fetch_offers(shop: &str) -> Result<Vec<Offer>, CommandError> {
    dotenvy::dotenv().ok();

    let shop = ShopDomain::parse(shop)?;
    let shopify = ShopifyAppConfig::from_env()?;
    let database_url = get_database_url("UPSELL_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    let store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool));

    let session = store
        .find_by_shop(&shop)
        .await?
        .ok_or_else(|| CommandError::NoSession(shop.clone()))?;

    tracing::info!(shop = %shop, "Fetching offers...");
    let client = AdminClient::new(&shopify);
    Ok(client.get_offers(&session.access_token, &shop).await?)
}
