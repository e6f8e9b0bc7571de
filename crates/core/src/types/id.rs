//! Newtype IDs for Shopify resources.
//!
//! Shopify exposes every resource twice: as a global id
//! (`gid://shopify/Product/123`) and as a numeric legacy resource id
//! (`123`). The offer payload carries the legacy form, which is what the
//! post-purchase changeset API expects.
//!
//! Use the `define_legacy_id!` macro to create type-safe wrappers that
//! prevent accidentally mixing ids from different resource types.

/// Macro to define a type-safe legacy resource id wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `as_str()` and `from_gid()` (strips `gid://shopify/<Type>/`)
/// - `Display` and `From<String>`
///
/// # Example
///
/// ```rust
/// # use upsell_core::define_legacy_id;
/// define_legacy_id!(OrderId, "Order");
///
/// let id = OrderId::from_gid("gid://shopify/Order/42").unwrap();
/// assert_eq!(id.as_str(), "42");
/// assert!(OrderId::from_gid("gid://shopify/Product/42").is_none());
/// ```
#[macro_export]
macro_rules! define_legacy_id {
    ($name:ident, $resource:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Shopify resource type name used in global ids.
            pub const RESOURCE: &'static str = $resource;

            /// Create a new id from its legacy (numeric) form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Extract the id from a global id of this resource type.
            ///
            /// Returns `None` when the gid belongs to another resource type
            /// or carries an empty id.
            #[must_use]
            pub fn from_gid(gid: &str) -> Option<Self> {
                $crate::types::id::strip_gid(gid, Self::RESOURCE).map(Self::new)
            }

            /// Get the underlying id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Render the id back into its global id form.
            #[must_use]
            pub fn to_gid(&self) -> String {
                format!("{}{}/{}", $crate::types::id::GID_PREFIX, Self::RESOURCE, self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

/// Prefix shared by all Shopify global ids.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Strip `gid://shopify/<resource>/` from a global id.
///
/// Everything after the prefix is kept, including any `?...` suffix.
#[must_use]
pub fn strip_gid<'a>(gid: &'a str, resource: &str) -> Option<&'a str> {
    let rest = gid.strip_prefix(GID_PREFIX)?.strip_prefix(resource)?;
    let id = rest.strip_prefix('/')?;
    (!id.is_empty()).then_some(id)
}

define_legacy_id!(ProductId, "Product");
define_legacy_id!(VariantId, "ProductVariant");
define_legacy_id!(SellingPlanId, "SellingPlan");
