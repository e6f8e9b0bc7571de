//! Offer API consumed by the post-purchase extension.
//!
//! The extension runs on Shopify's checkout origin, so every route here is
//! wrapped in a permissive CORS layer.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{
        Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Span, instrument};
use upsell_core::OfferResponse;

use crate::error::{AppError, set_sentry_shop};
use crate::services::CheckoutSession;
use crate::state::AppState;

/// Body sent with an offer request. Optional; a missing or unreadable body
/// is treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    /// Reference id of the initial purchase.
    #[serde(default)]
    pub reference_id: Option<String>,
}

/// CORS policy for the extension: any origin, bearer auth and JSON bodies.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Offer routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/offer", get(check).post(offers))
        .layer(cors_layer())
}

/// Authenticated existence check.
async fn check(session: CheckoutSession) -> StatusCode {
    tracing::debug!(shop = %session.shop, "Offer endpoint check");
    StatusCode::NO_CONTENT
}

/// Offers for the shop named by the session token.
#[instrument(skip_all, fields(shop = %session.shop, reference_id = tracing::field::Empty))]
async fn offers(
    State(state): State<AppState>,
    session: CheckoutSession,
    body: Bytes,
) -> Result<Json<OfferResponse>, AppError> {
    let request = parse_request(&body);
    if let Some(reference_id) = request.reference_id.as_ref().or(session.reference_id.as_ref()) {
        Span::current().record("reference_id", reference_id.as_str());
    }
    set_sentry_shop(session.shop.as_str());

    let stored = state
        .sessions()
        .find_by_shop(&session.shop)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no session for {}", session.shop)))?;

    let offers = state
        .shopify()
        .get_offers(&stored.access_token, &session.shop)
        .await?;

    tracing::info!(count = offers.len(), "Offers served");

    Ok(Json(OfferResponse {
        offers,
        time: state.countdown_seconds(),
    }))
}

fn parse_request(body: &[u8]) -> OfferRequest {
    if body.iter().all(u8::is_ascii_whitespace) {
        return OfferRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring unreadable offer request body");
        OfferRequest::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_reads_reference_id() {
        let request = parse_request(br#"{"referenceId":"ref-9"}"#);
        assert_eq!(request.reference_id.as_deref(), Some("ref-9"));
    }

    #[test]
    fn test_parse_request_tolerates_empty_and_invalid_bodies() {
        for body in [&b""[..], b"  \n", b"{", b"not json", b"[1,2]", b"null"] {
            assert!(parse_request(body).reference_id.is_none());
        }
    }
}
