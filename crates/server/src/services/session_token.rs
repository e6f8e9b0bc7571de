//! Checkout session-token verification.
//!
//! The post-purchase extension sends `Authorization: Bearer <jwt>`. The token
//! is an HS256 JWT signed with the app's API secret; its
//! `input_data.shop.domain` claim names the shop the checkout belongs to.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use upsell_core::{ShopDomain, ShopDomainError};

use crate::config::ShopifyAppConfig;

/// Clock skew tolerated on `exp` and `nbf`, in seconds.
pub const LEEWAY_SECONDS: u64 = 5;

/// Errors that can occur while verifying a session token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// The token is not a well-formed JWT or lacks required claims.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The header names an algorithm other than HS256.
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    /// The signature does not match.
    #[error("invalid signature")]
    InvalidSignature,

    /// `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// `nbf` is in the future.
    #[error("token not yet valid")]
    NotYetValid,

    /// `aud` is not this app.
    #[error("token audience mismatch")]
    AudienceMismatch,

    /// The shop claim is not a store domain.
    #[error("invalid shop claim: {0}")]
    InvalidShop(#[from] ShopDomainError),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm => Self::UnsupportedAlgorithm,
            ErrorKind::InvalidAudience => Self::AudienceMismatch,
            _ => Self::Malformed(e.to_string()),
        }
    }
}

/// The verified caller of the offer endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Shop the checkout belongs to.
    pub shop: ShopDomain,
    /// Reference id of the initial purchase, when the token carries one.
    pub reference_id: Option<String>,
}

/// Claims read from the token; `exp`, `nbf` and `aud` are checked by `Validation`.
#[derive(Debug, Deserialize)]
struct Claims {
    input_data: InputData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputData {
    shop: ShopClaim,
    #[serde(default)]
    initial_purchase: Option<InitialPurchase>,
}

#[derive(Debug, Deserialize)]
struct ShopClaim {
    domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialPurchase {
    reference_id: String,
}

/// Verifies session tokens issued to the post-purchase extension.
///
/// Implements `Debug` manually to keep the decoding key out of logs.
#[derive(Clone)]
pub struct SessionTokenVerifier {
    api_key: String,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenVerifier")
            .field("api_key", &self.api_key)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl SessionTokenVerifier {
    /// Create a verifier from the app's credentials.
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.api_secret.expose_secret().as_bytes());

        // `aud` is optional in checkout tokens; when present it must be this app.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = LEEWAY_SECONDS;
        validation.set_audience(&[config.api_key.as_str()]);

        Self {
            api_key: config.api_key.clone(),
            decoding_key,
            validation,
        }
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token is malformed, badly signed, expired,
    /// issued for another app, or names an invalid shop.
    pub fn verify(&self, token: &str) -> Result<CheckoutSession, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .inspect_err(|e| debug!("Session token validation failed: {e:?}"))?;

        let input = token_data.claims.input_data;
        let shop = ShopDomain::parse(&input.shop.domain)?;
        debug!(shop = %shop, "Session token verified");

        Ok(CheckoutSession {
            shop,
            reference_id: input.initial_purchase.map(|purchase| purchase.reference_id),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    const SECRET: &str = "9f86d081884c7d659a2feaa0c55ad015";

    fn verifier() -> SessionTokenVerifier {
        SessionTokenVerifier::new(&ShopifyAppConfig {
            api_key: "test_api_key".to_string(),
            api_secret: SecretString::from(SECRET),
            api_version: "2024-10".to_string(),
            admin_base_url: None,
        })
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn sign_with(header: &Header, claims: &serde_json::Value, secret: &str) -> String {
        encode(header, claims, &EncodingKey::from_secret(secret.as_bytes()))
            .expect("failed to encode test JWT")
    }

    fn sign(claims: &serde_json::Value) -> String {
        sign_with(&Header::new(Algorithm::HS256), claims, SECRET)
    }

    fn claims() -> serde_json::Value {
        json!({
            "iss": "https://checkout.shopify.com",
            "aud": "test_api_key",
            "exp": now() + 60,
            "nbf": now() - 60,
            "input_data": {
                "shop": { "domain": "dark-roast.myshopify.com" },
                "initialPurchase": { "referenceId": "ref-123" }
            }
        })
    }

    #[test]
    fn test_valid_token() {
        let session = verifier().verify(&sign(&claims())).unwrap();
        assert_eq!(session.shop.as_str(), "dark-roast.myshopify.com");
        assert_eq!(session.reference_id.as_deref(), Some("ref-123"));
    }

    #[test]
    fn test_token_without_audience_or_purchase() {
        let claims = json!({
            "exp": now() + 60,
            "input_data": { "shop": { "domain": "dark-roast.myshopify.com" } }
        });
        let session = verifier().verify(&sign(&claims)).unwrap();
        assert!(session.reference_id.is_none());
    }

    #[test]
    fn test_audience_array() {
        let mut claims = claims();
        claims["aud"] = json!(["other", "test_api_key"]);
        assert!(verifier().verify(&sign(&claims)).is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let token = sign_with(
            &Header::new(Algorithm::HS256),
            &claims(),
            "a-different-app-secret-value-123",
        );
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_claims() {
        let token = sign(&claims());
        let mut forged = claims();
        forged["input_data"]["shop"]["domain"] = json!("evil.myshopify.com");
        let forged_token = sign(&forged);

        // Forged payload with the original signature
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_token.split('.').nth(1).unwrap();
        assert!(matches!(
            verifier().verify(&parts.join(".")),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut claims = claims();
        claims["exp"] = json!(now() - 120);
        claims["nbf"] = json!(now() - 600);
        assert!(matches!(
            verifier().verify(&sign(&claims)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_expiry_within_leeway_accepted() {
        let mut claims = claims();
        claims["exp"] = json!(now() - 2);
        assert!(verifier().verify(&sign(&claims)).is_ok());
    }

    #[test]
    fn test_expiry_just_past_leeway_rejected() {
        #[allow(clippy::cast_possible_wrap)]
        let leeway = LEEWAY_SECONDS as i64;
        let mut claims = claims();
        claims["exp"] = json!(now() - leeway - 1);
        assert!(matches!(
            verifier().verify(&sign(&claims)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_extreme_timestamps_do_not_panic() {
        let mut claims = claims();
        claims["exp"] = json!(i64::MAX);
        assert!(verifier().verify(&sign(&claims)).is_ok());

        claims["nbf"] = json!(i64::MAX);
        assert!(matches!(
            verifier().verify(&sign(&claims)),
            Err(AuthError::NotYetValid)
        ));
    }

    #[test]
    fn test_not_yet_valid() {
        let mut claims = claims();
        claims["nbf"] = json!(now() + 120);
        assert!(matches!(
            verifier().verify(&sign(&claims)),
            Err(AuthError::NotYetValid)
        ));
    }

    #[test]
    fn test_audience_mismatch() {
        let mut claims = claims();
        claims["aud"] = json!("another_app");
        assert!(matches!(
            verifier().verify(&sign(&claims)),
            Err(AuthError::AudienceMismatch)
        ));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let token = sign_with(&Header::new(Algorithm::HS512), &claims(), SECRET);
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::UnsupportedAlgorithm)
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.!!.!!"] {
            assert!(
                matches!(verifier().verify(token), Err(AuthError::Malformed(_))),
                "{token}"
            );
        }
    }

    #[test]
    fn test_missing_shop_claim_is_malformed() {
        let mut claims = claims();
        claims["input_data"] = json!({ "initialPurchase": { "referenceId": "ref-123" } });
        assert!(matches!(
            verifier().verify(&sign(&claims)),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_shop_claim() {
        let mut claims = claims();
        claims["input_data"]["shop"]["domain"] = json!("https://dark-roast.myshopify.com");
        assert!(matches!(
            verifier().verify(&sign(&claims)),
            Err(AuthError::InvalidShop(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug_output = format!("{:?}", verifier());
        assert!(!debug_output.contains(SECRET));
    }
}
