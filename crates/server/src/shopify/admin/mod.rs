//! Shopify Admin API GraphQL client.
//!
//! This module provides a type-safe client for the Shopify Admin API. Each
//! call is authenticated with the shop's stored offline access token.

use std::sync::Arc;

use graphql_client::GraphQLQuery;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;
use upsell_core::ShopDomain;

use crate::config::ShopifyAppConfig;

use super::{AdminShopifyError, GraphQLError, GraphQLErrorLocation};

mod conversions;
mod offers;
pub mod queries;

/// Access token header expected by the Admin API.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Longest error body kept in [`AdminShopifyError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; the underlying `reqwest::Client` connection pool is
/// shared between clones.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    api_version: String,
    /// Replaces `https://{shop}` when set (tests, egress proxies).
    base_url: Option<String>,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("api_version", &self.inner.api_version)
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify app configuration
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                api_version: config.api_version.clone(),
                base_url: config
                    .admin_base_url
                    .as_ref()
                    .map(|url| url.as_str().trim_end_matches('/').to_string()),
            }),
        }
    }

    /// GraphQL endpoint for a shop.
    #[must_use]
    pub fn endpoint(&self, shop: &ShopDomain) -> String {
        let base = self
            .inner
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"));

        format!("{base}/admin/api/{}/graphql.json", self.inner.api_version)
    }

    /// Execute a GraphQL query against a shop's Admin API.
    #[instrument(skip(self, access_token, variables), fields(shop = %shop))]
    async fn execute<Q: GraphQLQuery>(
        &self,
        shop: &ShopDomain,
        access_token: &SecretString,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let endpoint = self.endpoint(shop);
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&endpoint)
            .header(ACCESS_TOKEN_HEADER, access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting (Shopify sends fractional seconds, e.g. "2.0")
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map_or(60, |secs| secs.ceil() as u64);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdminShopifyError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<Q::ResponseData> = serde_json::from_slice(&bytes)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: Option<&str>) -> ShopifyAppConfig {
        ShopifyAppConfig {
            api_key: "test_api_key".to_string(),
            api_secret: SecretString::from("test_api_secret"),
            api_version: "2024-10".to_string(),
            admin_base_url: base_url.map(|u| url::Url::parse(u).unwrap()),
        }
    }

    #[test]
    fn test_admin_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AdminClient>();
    }

    #[test]
    fn test_admin_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdminClient>();
    }

    #[test]
    fn test_endpoint_uses_shop_domain() {
        let client = AdminClient::new(&config(None));
        let shop = ShopDomain::parse("dark-roast.myshopify.com").unwrap();
        assert_eq!(
            client.endpoint(&shop),
            "https://dark-roast.myshopify.com/admin/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn test_endpoint_honours_base_url_override() {
        let client = AdminClient::new(&config(Some("http://127.0.0.1:9999/")));
        let shop = ShopDomain::parse("dark-roast.myshopify.com").unwrap();
        assert_eq!(
            client.endpoint(&shop),
            "http://127.0.0.1:9999/admin/api/2024-10/graphql.json"
        );
    }
}
