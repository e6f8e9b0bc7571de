//! Checkout session extractor.
//!
//! Requires a valid session token from the post-purchase extension.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn handler(session: CheckoutSession) -> impl IntoResponse {
//!     format!("Hello, {}!", session.shop)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::services::{AuthError, CheckoutSession};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::Malformed("non-ASCII authorization header".to_string()))?;

    let token = value
        .get(..BEARER_PREFIX.len())
        .filter(|scheme| scheme.eq_ignore_ascii_case(BEARER_PREFIX))
        .and_then(|_| value.get(BEARER_PREFIX.len()..))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    Ok(token)
}

impl FromRequestParts<AppState> for CheckoutSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        Ok(state.verifier().verify(token)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/offer");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&parts(Some("bearer abc"))).unwrap(), "abc");
    }

    #[test]
    fn test_missing_or_empty_token() {
        for header in [None, Some("Bearer "), Some("Basic dXNlcjpwYXNz"), Some("Bear")] {
            assert!(
                matches!(bearer_token(&parts(header)), Err(AuthError::MissingToken)),
                "{header:?}"
            );
        }
    }
}
