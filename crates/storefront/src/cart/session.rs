//! Session-backed cart persistence adapter.
//!
//! The cart store itself is pure; this adapter is the explicit side-effect
//! boundary. Handlers load the cart, mutate it, and save it back - a failed
//! session write surfaces as an error response rather than being dropped.

use tower_sessions::Session;

use crate::cart::{Cart, CartLine};
use crate::models::session_keys;

/// Loads and saves the cart line list under a fixed session key.
pub struct SessionCart;

impl SessionCart {
    /// Load the cart from the session. A missing key is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session read fails.
    pub async fn load(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
        let lines: Option<Vec<CartLine>> = session.get(session_keys::CART).await?;
        Ok(Cart::from_lines(lines.unwrap_or_default()))
    }

    /// Persist the full line list. Called after every cart mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the session write fails.
    pub async fn save(
        session: &Session,
        cart: &Cart,
    ) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::CART, cart.lines()).await
    }

    /// Drop the cart entirely (after a completed checkout).
    ///
    /// # Errors
    ///
    /// Returns an error if the session write fails.
    pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
        session
            .remove::<Vec<CartLine>>(session_keys::CART)
            .await
            .map(|_| ())
    }
}
