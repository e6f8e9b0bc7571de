//! Upsell server library.
//!
//! Serves offers to the post-purchase checkout extension. Exposed as a
//! library so the router can be driven in-process by tests and the CLI can
//! reuse the Shopify client and session store.
//!
//! # Security
//!
//! This crate reads Shopify Admin API access tokens from the session table.
//! Tokens are wrapped in `SecretString` and redacted from debug output.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
