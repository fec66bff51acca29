//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use stride_core::CustomerId;

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the signed-in customer.
/// Authentication itself is delegated to Clerk; this is just the cached
/// result of the OAuth callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Clerk user id.
    pub id: CustomerId,
    /// Email address, when Clerk shared one.
    pub email: Option<String>,
    /// Display name, when Clerk shared one.
    pub name: Option<String>,
}

/// Session keys for persisted state.
pub mod keys {
    use stride_core::CustomerId;

    /// Key for storing the current signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the cart line list.
    pub const CART: &str = "cart";

    /// Key for Clerk OAuth state (CSRF protection).
    pub const CLERK_OAUTH_STATE: &str = "clerk_oauth_state";

    /// Key for a customer's wishlist product ids.
    ///
    /// Namespaced by the signed-in identity so two customers sharing a
    /// browser never share a wishlist.
    #[must_use]
    pub fn wishlist(customer: &CustomerId) -> String {
        format!("wishlist:{customer}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wishlist_key_is_scoped_per_customer() {
        let a = keys::wishlist(&CustomerId::new("user_a"));
        let b = keys::wishlist(&CustomerId::new("user_b"));
        assert_eq!(a, "wishlist:user_a");
        assert_ne!(a, b);
    }
}
