//! In-memory session store for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use upsell_core::ShopDomain;

use super::{RepositoryError, SessionStore, StoredSession};

/// Session store backed by a map keyed on session id.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session.
    pub async fn insert(&self, session: StoredSession) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<StoredSession>, RepositoryError> {
        let now = Utc::now();
        let sessions = self.sessions.read().await;

        let found = sessions
            .values()
            .filter(|s| &s.shop == shop && !s.is_expired_at(now))
            .min_by(|a, b| (a.is_online, &a.id).cmp(&(b.is_online, &b.id)))
            .cloned();

        Ok(found)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use secrecy::{ExposeSecret, SecretString};

    use super::*;

    fn session(id: &str, shop: &str, is_online: bool, token: &str) -> StoredSession {
        StoredSession {
            id: id.to_string(),
            shop: ShopDomain::parse(shop).unwrap(),
            access_token: SecretString::from(token),
            scope: None,
            is_online,
            expires: None,
        }
    }

    #[tokio::test]
    async fn test_missing_shop_returns_none() {
        let store = MemorySessionStore::new();
        let shop = ShopDomain::parse("dark-roast.myshopify.com").unwrap();
        assert!(store.find_by_shop(&shop).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_offline_session_preferred() {
        let store = MemorySessionStore::new();
        store
            .insert(session("a-online", "dark-roast.myshopify.com", true, "online"))
            .await;
        store
            .insert(session("z-offline", "dark-roast.myshopify.com", false, "offline"))
            .await;
        store
            .insert(session("other", "light-roast.myshopify.com", false, "other"))
            .await;

        let shop = ShopDomain::parse("dark-roast.myshopify.com").unwrap();
        let found = store.find_by_shop(&shop).await.unwrap().unwrap();
        assert_eq!(found.access_token.expose_secret(), "offline");
    }

    #[tokio::test]
    async fn test_expired_session_skipped() {
        let store = MemorySessionStore::new();
        let mut expired = session("online", "dark-roast.myshopify.com", true, "stale");
        expired.expires = Some(Utc::now() - Duration::minutes(1));
        store.insert(expired).await;

        let shop = ShopDomain::parse("dark-roast.myshopify.com").unwrap();
        assert!(store.find_by_shop(&shop).await.unwrap().is_none());
    }
}
