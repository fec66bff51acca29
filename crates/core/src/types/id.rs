//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_str_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. All external systems
//! this storefront talks to (Sanity, Stripe, Clerk) hand out opaque string
//! identifiers, so the wrappers are string-backed.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use stride_core::define_str_id;
/// define_str_id!(ProductId);
/// define_str_id!(OrderId);
///
/// let product_id = ProductId::new("prod-1");
/// let order_id = OrderId::new("ord-1");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = order_id;
/// ```
#[macro_export]
macro_rules! define_str_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Sanity document IDs
define_str_id!(ProductId);
define_str_id!(BrandId);
define_str_id!(CategoryId);
define_str_id!(OrderId);
define_str_id!(AddressId);

// Clerk identities
define_str_id!(CustomerId);

// Stripe identifiers
define_str_id!(CheckoutSessionId);
define_str_id!(PaymentIntentId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = ProductId::new("prod-abc123");
        assert_eq!(id.as_str(), "prod-abc123");
        assert_eq!(id.to_string(), "prod-abc123");
        assert_eq!(id.clone().into_inner(), "prod-abc123");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = CheckoutSessionId::new("cs_test_123");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"cs_test_123\"");

        let back: CheckoutSessionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_equality_within_type() {
        assert_eq!(ProductId::new("a"), ProductId::from("a"));
        assert_ne!(ProductId::new("a"), ProductId::new("b"));
    }
}
