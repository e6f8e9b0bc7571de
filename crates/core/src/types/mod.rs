//! Core types for the upsell service.
//!
//! This module provides type-safe wrappers for shop domains, Shopify
//! resource ids, and the offer payload.

pub mod id;
pub mod offer;
pub mod shop;

pub use id::*;
pub use offer::{Offer, OfferResponse, SelectedOption, Variant};
pub use shop::{ShopDomain, ShopDomainError};
