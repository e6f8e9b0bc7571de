//! Integration tests for the upsell service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p upsell-integration-tests
//! ```
//!
//! No database or Shopify credentials are needed: Shopify is replaced by a
//! `wiremock` server and sessions live in a `MemorySessionStore`.
//!
//! # Test Categories
//!
//! - `offer_fetcher` - Admin API client against a mock Shopify
//! - `offer_api` - HTTP routes driven in-process with `tower::ServiceExt`

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::SecretString;
use serde_json::{Value, json};
use upsell_core::ShopDomain;
use upsell_server::config::ShopifyAppConfig;
use upsell_server::db::{MemorySessionStore, StoredSession};
use upsell_server::routes::build_router;
use upsell_server::state::AppState;
use wiremock::MockServer;

/// App client id used by every test.
pub const API_KEY: &str = "test_api_key";
/// App client secret used to sign test session tokens.
pub const API_SECRET: &str = "9f86d081884c7d659a2feaa0c55ad015";
/// Shop used by every test.
pub const SHOP: &str = "dark-roast.myshopify.com";
/// Offline token stored for [`SHOP`].
pub const ACCESS_TOKEN: &str = "shpat_test_offline_token";
/// Admin API version configured in tests.
pub const API_VERSION: &str = "2024-10";
/// Path the Admin API client posts to.
pub const GRAPHQL_PATH: &str = "/admin/api/2024-10/graphql.json";

/// Shopify app settings pointing the Admin API at `server`.
#[must_use]
pub fn shopify_config(server: &MockServer) -> ShopifyAppConfig {
    ShopifyAppConfig {
        api_key: API_KEY.to_string(),
        api_secret: SecretString::from(API_SECRET),
        api_version: API_VERSION.to_string(),
        admin_base_url: Some(url::Url::parse(&server.uri()).expect("mock server uri")),
    }
}

/// Parse a shop domain.
#[must_use]
pub fn shop(domain: &str) -> ShopDomain {
    ShopDomain::parse(domain).expect("valid shop domain")
}

/// The offline session for [`SHOP`].
#[must_use]
pub fn offline_session() -> StoredSession {
    StoredSession {
        id: format!("offline_{SHOP}"),
        shop: shop(SHOP),
        access_token: SecretString::from(ACCESS_TOKEN),
        scope: Some("read_products".to_string()),
        is_online: false,
        expires: None,
    }
}

/// Router wired to `server` with the given sessions and countdown.
#[must_use]
pub fn test_app(server: &MockServer, sessions: MemorySessionStore, countdown: u32) -> Router {
    let state = AppState::new(&shopify_config(server), countdown, Arc::new(sessions));
    build_router(state)
}

/// Sign a session token with `secret`.
#[must_use]
pub fn sign_token(claims: &Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode test JWT")
}

/// Claims the checkout host issues for `shop`, valid for a minute.
#[must_use]
pub fn checkout_claims(shop: &str) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": "https://checkout.shopify.com",
        "aud": API_KEY,
        "iat": now,
        "nbf": now,
        "exp": now + 60,
        "input_data": {
            "shop": { "domain": shop },
            "initialPurchase": { "referenceId": "ref-1001" }
        }
    })
}

/// A valid session token for `shop`.
#[must_use]
pub fn session_token(shop: &str) -> String {
    sign_token(&checkout_claims(shop), API_SECRET)
}

/// Admin API variant node.
#[must_use]
pub fn variant_node(id: u64, price: &str, size: &str, selling_plan: Option<u64>) -> Value {
    let plans = selling_plan.map_or_else(Vec::new, |plan| {
        vec![json!({ "node": { "id": format!("gid://shopify/SellingPlan/{plan}") } })]
    });

    json!({
        "node": {
            "id": format!("gid://shopify/ProductVariant/{id}"),
            "legacyResourceId": id.to_string(),
            "price": price,
            "compareAtPrice": null,
            "selectedOptions": [{ "name": "Size", "value": size }],
            "sellingPlanGroups": {
                "edges": [{ "node": { "sellingPlans": { "edges": plans } } }]
            }
        }
    })
}

/// Admin API product node.
#[must_use]
pub fn product_node(id: u64, title: &str, variants: Vec<Value>) -> Value {
    json!({
        "node": {
            "id": format!("gid://shopify/Product/{id}"),
            "legacyResourceId": id.to_string(),
            "title": title,
            "featuredImage": { "url": format!("https://cdn.shopify.com/{id}.jpg") },
            "description": format!("{title} description"),
            "variants": { "edges": variants }
        }
    })
}

/// Full `GetOffers` response body.
#[must_use]
pub fn offers_body(products: Vec<Value>) -> Value {
    json!({
        "data": {
            "products": {
                "edges": products
            }
        }
    })
}

/// One product with a 10.00 subscribable variant and a 15.00 one-time variant.
#[must_use]
pub fn coffee_offers_body() -> Value {
    offers_body(vec![product_node(
        632_910_392,
        "Dark Roast",
        vec![
            variant_node(808_950_810, "10.00", "Small", Some(3_000_001)),
            variant_node(808_950_811, "15.00", "Large", None),
        ],
    )])
}
