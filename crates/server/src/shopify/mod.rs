//! Shopify Admin API client for offer lookups.
//!
//! # Security
//!
//! Every call is made with the offline access token stored for the shop the
//! request came from. Tokens are passed per call and never cached here.
//!
//! # Architecture
//!
//! - Uses `graphql-client` crate for type-safe GraphQL queries
//! - Direct API calls to Shopify (no local product sync, no cache)
//! - One fixed query per offer request, no retries
//!
//! # Example
//!
//! ```rust,ignore
//! use upsell_server::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify);
//! let offers = client.get_offers(&session.access_token, &shop).await?;
//! ```

mod admin;

pub use admin::AdminClient;
pub use admin::queries;

use thiserror::Error;

/// Message returned for every offer fetch failure.
pub const OFFER_FETCH_FAILED: &str = "Failed to fetch offers from Shopify";

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Shopify answered with an unexpected HTTP status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// A money scalar could not be parsed as a decimal.
    #[error("Invalid money amount '{0}'")]
    InvalidMoney(String),
}

/// The single failure surfaced by the offer fetcher.
///
/// The underlying cause is logged where it happens; callers only learn that
/// the fetch failed.
#[derive(Debug, Error)]
pub enum OfferError {
    /// Transport, GraphQL or conversion failure.
    #[error("Failed to fetch offers from Shopify")]
    FetchFailed,
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Access denied".to_string(),
                locations: vec![],
                path: vec![],
            },
        ];
        let err = AdminShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Access denied"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = AdminShopifyError::RateLimited(2);
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
    }

    #[test]
    fn test_offer_error_message_is_fixed() {
        assert_eq!(OfferError::FetchFailed.to_string(), OFFER_FETCH_FAILED);
    }
}
