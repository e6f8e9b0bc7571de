//! Stored Shopify sessions.
//!
//! The install flow writes one offline session per shop (and optionally
//! online, per-user sessions). The offer API reads the access token from
//! the offline one when it exists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::PgPool;
use upsell_core::ShopDomain;

use super::RepositoryError;

// =============================================================================
// Types
// =============================================================================

/// A Shopify session row.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StoredSession {
    /// Session id assigned by the install flow.
    pub id: String,
    /// Shop the session belongs to.
    pub shop: ShopDomain,
    /// Admin API access token (redacted in debug output).
    pub access_token: SecretString,
    /// Granted scopes, comma separated.
    pub scope: Option<String>,
    /// Whether this is an online (per-user) session.
    pub is_online: bool,
    /// Expiry for online sessions; offline sessions never expire.
    pub expires: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("is_online", &self.is_online)
            .field("expires", &self.expires)
            .finish()
    }
}

impl StoredSession {
    /// Whether the session is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }
}

/// Internal row type for `PostgreSQL` queries.
///
/// `shop` decodes through `ShopDomain`, so a row holding an invalid domain
/// fails as a column decode error.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    shop: ShopDomain,
    access_token: String,
    scope: Option<String>,
    is_online: bool,
    expires: Option<DateTime<Utc>>,
}

impl From<SessionRow> for StoredSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            shop: row.shop,
            access_token: SecretString::from(row.access_token),
            scope: row.scope,
            is_online: row.is_online,
            expires: row.expires,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Read access to stored sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Find the session to use for a shop.
    ///
    /// Offline sessions win over online ones; expired sessions are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn find_by_shop(&self, shop: &ShopDomain)
    -> Result<Option<StoredSession>, RepositoryError>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be reached.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed session store.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<StoredSession>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, shop, access_token, scope, is_online, expires
            FROM session
            WHERE shop = $1
              AND (expires IS NULL OR expires > NOW())
            ORDER BY is_online ASC, id
            LIMIT 1
            ",
        )
        .bind(shop)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredSession::from))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
