//! Application state shared across handlers.

use std::sync::Arc;

use crate::{
    config::ShopifyAppConfig, db::SessionStore, services::SessionTokenVerifier,
    shopify::AdminClient,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    sessions: Arc<dyn SessionStore>,
    shopify: AdminClient,
    verifier: SessionTokenVerifier,
    countdown_seconds: u32,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("shopify", &self.inner.shopify)
            .field("verifier", &self.inner.verifier)
            .field("countdown_seconds", &self.inner.countdown_seconds)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state from the Shopify app settings and a session store.
    #[must_use]
    pub fn new(
        shopify: &ShopifyAppConfig,
        countdown_seconds: u32,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                sessions,
                shopify: AdminClient::new(shopify),
                verifier: SessionTokenVerifier::new(shopify),
                countdown_seconds,
            }),
        }
    }

    /// Stored Shopify sessions.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.inner.sessions.as_ref()
    }

    /// Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    /// Session token verifier.
    #[must_use]
    pub fn verifier(&self) -> &SessionTokenVerifier {
        &self.inner.verifier
    }

    /// Countdown returned with every offer payload.
    #[must_use]
    pub fn countdown_seconds(&self) -> u32 {
        self.inner.countdown_seconds
    }
}
