//! Business logic services.

pub mod session_token;

pub use session_token::{AuthError, CheckoutSession, SessionTokenVerifier};
