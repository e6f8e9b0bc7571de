//! Upsell Core - Shared types library.
//!
//! This crate provides the types shared by the upsell components:
//! - `server` - Offer API consumed by the post-purchase extension
//! - `cli` - Command-line tools for migrations and offer previews
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Offers, variants, shop domains and Shopify resource ids
//! - [`changeset`] - Change requests the extension submits to the checkout host
//! - [`countdown`] - Offer countdown formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod changeset;
pub mod countdown;
pub mod types;

pub use changeset::{
    Change, ChangesetError, Discount, DiscountPolicy, PurchaseType, build_changes, size_options,
};
pub use countdown::{Countdown, format_countdown};
pub use types::*;
