//! Domain types for the Sanity content backend.
//!
//! These mirror the projections used by the GROQ queries in
//! [`super::queries`]. Image fields are always projected to plain URLs on the
//! query side (`images[].asset->url`), so no asset-reference plumbing leaks
//! into the rest of the storefront.

use serde::{Deserialize, Serialize};

use stride_core::{AddressId, BrandId, CategoryId, OrderId, ProductId};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Sanity document id.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug (projected from `slug.current`).
    #[serde(default)]
    pub slug: Option<String>,
    /// Current selling price in major units.
    pub price: f64,
    /// Amount off the original price; the original price is
    /// `price + discount`.
    #[serde(default)]
    pub discount: Option<f64>,
    /// Units in stock; `None` means untracked.
    #[serde(default)]
    pub stock: Option<i64>,
    /// Merchandising badge (e.g., "new", "hot", "sale").
    #[serde(default)]
    pub status: Option<String>,
    /// Category slug this product belongs to.
    #[serde(default)]
    pub variant: Option<String>,
    /// Long-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Image URLs (projected from `images[].asset->url`).
    #[serde(default)]
    pub images: Vec<String>,
    /// Referenced brand, dereferenced to its title.
    #[serde(default)]
    pub brand: Option<BrandRef>,
}

impl Product {
    /// First image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|s| s > 0)
    }

    /// Original price before discount, when a discount applies.
    #[must_use]
    pub fn original_price(&self) -> Option<f64> {
        self.discount
            .filter(|d| *d > 0.0)
            .map(|d| self.price + d)
    }
}

/// Dereferenced brand on a product (`brand->{title}`).
#[derive(Debug, Clone, Deserialize)]
pub struct BrandRef {
    pub title: String,
}

/// A brand document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Logo URL (projected from `image.asset->url`).
    #[serde(default)]
    pub image: Option<String>,
}

/// A category document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Product range blurb shown on category cards.
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    /// Hero image URL (projected from `image.asset->url`).
    #[serde(default)]
    pub image: Option<String>,
}

/// Authoritative product record fetched for checkout validation.
///
/// Deliberately narrow: only the fields the checkout initiator needs to
/// price and describe a Stripe line item.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

// =============================================================================
// Order Types (read side)
// =============================================================================

/// An order document as read back for the order-history page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub email: String,
    pub total_price: f64,
    pub currency: String,
    pub status: String,
    pub order_date: String,
    #[serde(default)]
    pub address: Option<OrderAddress>,
    #[serde(default)]
    pub products: Vec<OrderLine>,
}

/// Shipping address embedded in an order document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderAddress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

/// A line on an order, with the referenced product dereferenced.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub quantity: u32,
    #[serde(default)]
    pub product: Option<OrderLineProduct>,
}

/// Product fields projected onto an order line.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: f64,
}

// =============================================================================
// Write Types (webhook side)
// =============================================================================

/// A Sanity reference (`{_type: "reference", _ref: "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(rename = "_ref")]
    pub reference: String,
}

impl Reference {
    /// Reference a document by id.
    #[must_use]
    pub fn to_document(id: &str) -> Self {
        Self {
            kind: "reference".to_string(),
            reference: id.to_string(),
        }
    }
}

/// A product entry in an order document being written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderProductEntry {
    #[serde(rename = "_key")]
    pub key: String,
    pub product: Reference,
    pub quantity: u32,
}

/// The order document written by the webhook handler.
///
/// Field names follow the content schema (camelCase on the wire). `_id` is
/// derived from the Stripe checkout session id so `createIfNotExists` makes
/// redelivered webhooks a safe no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub kind: String,
    pub order_number: String,
    pub stripe_checkout_session_id: String,
    pub stripe_customer_id: String,
    pub clerk_user_id: String,
    pub customer_name: String,
    pub email: String,
    pub stripe_payment_intent_id: String,
    pub products: Vec<OrderProductEntry>,
    pub total_price: f64,
    pub currency: String,
    pub amount_discount: f64,
    pub address: Option<OrderAddress>,
    pub status: String,
    pub order_date: String,
}

/// An address document as stored in the opportunistic address cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    #[serde(rename = "_type")]
    pub kind: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub default: bool,
    pub created_at: String,
}

impl AddressDocument {
    /// Whether this cached address matches a shipping address on the
    /// street/city/zip triple used for deduplication.
    #[must_use]
    pub fn matches(&self, other: &OrderAddress) -> bool {
        other.address.as_deref() == Some(self.address.as_str())
            && other.city.as_deref() == Some(self.city.as_str())
            && other.zip.as_deref() == Some(self.zip.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserialize_projection() {
        let json = serde_json::json!({
            "_id": "prod-1",
            "name": "Trail Runner GTX",
            "slug": "trail-runner-gtx",
            "price": 129.99,
            "discount": 20.0,
            "stock": 3,
            "variant": "running",
            "images": ["https://cdn.sanity.io/images/a/p/shoe.jpg"],
            "brand": { "title": "Stride" }
        });

        let product: Product = serde_json::from_value(json).expect("deserialize product");
        assert_eq!(product.id.as_str(), "prod-1");
        assert_eq!(product.primary_image(), Some("https://cdn.sanity.io/images/a/p/shoe.jpg"));
        assert!(product.in_stock());
        assert_eq!(product.original_price(), Some(149.99));
    }

    #[test]
    fn test_product_out_of_stock() {
        let json = serde_json::json!({
            "_id": "prod-2",
            "name": "Court Shoe",
            "price": 59.0,
            "stock": 0
        });

        let product: Product = serde_json::from_value(json).expect("deserialize product");
        assert!(!product.in_stock());
        assert_eq!(product.original_price(), None);
    }

    #[test]
    fn test_order_document_wire_names() {
        let doc = OrderDocument {
            id: "order-cs_1".to_string(),
            kind: "order".to_string(),
            order_number: "ORD-1-X".to_string(),
            stripe_checkout_session_id: "cs_1".to_string(),
            stripe_customer_id: "cus_1".to_string(),
            clerk_user_id: "user_1".to_string(),
            customer_name: "Jess".to_string(),
            email: "jess@example.com".to_string(),
            stripe_payment_intent_id: "pi_1".to_string(),
            products: vec![OrderProductEntry {
                key: "p1-1".to_string(),
                product: Reference::to_document("p1"),
                quantity: 2,
            }],
            total_price: 40.0,
            currency: "USD".to_string(),
            amount_discount: 0.0,
            address: None,
            status: "paid".to_string(),
            order_date: "2026-01-01T00:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(value["_type"], "order");
        assert_eq!(value["stripeCheckoutSessionId"], "cs_1");
        assert_eq!(value["clerkUserId"], "user_1");
        assert_eq!(value["products"][0]["product"]["_ref"], "p1");
        assert_eq!(value["totalPrice"], 40.0);
    }

    #[test]
    fn test_address_matches_on_street_city_zip() {
        let cached = AddressDocument {
            id: None,
            kind: "address".to_string(),
            name: "Jess".to_string(),
            email: "jess@example.com".to_string(),
            address: "1 Main St".to_string(),
            city: "Denver".to_string(),
            state: "CO".to_string(),
            zip: "80202".to_string(),
            default: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let same = OrderAddress {
            name: Some("Different Name".to_string()),
            address: Some("1 Main St".to_string()),
            city: Some("Denver".to_string()),
            state: Some("WY".to_string()),
            zip: Some("80202".to_string()),
        };
        assert!(cached.matches(&same));

        let different = OrderAddress {
            zip: Some("80203".to_string()),
            ..same
        };
        assert!(!cached.matches(&different));
    }
}
