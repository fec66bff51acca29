//! Account route handlers.
//!
//! These routes require a signed-in customer.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::sanity::types::Order;
use crate::state::AppState;

/// Order line display data.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub image_url: String,
}

/// Order display data for the history page.
#[derive(Clone)]
pub struct OrderView {
    pub number: String,
    pub date: String,
    pub status: String,
    pub total: String,
    pub lines: Vec<OrderLineView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: order.order_number.clone(),
            date: order.order_date.clone(),
            status: order.status.clone(),
            total: format!("{} {:.2}", order.currency, order.total_price),
            lines: order
                .products
                .iter()
                .map(|line| OrderLineView {
                    name: line
                        .product
                        .as_ref()
                        .map_or_else(|| "Unavailable product".to_string(), |p| p.name.clone()),
                    quantity: line.quantity,
                    image_url: line
                        .product
                        .as_ref()
                        .and_then(|p| p.images.first().cloned())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/orders.html")]
pub struct OrdersTemplate {
    pub customer_name: String,
    pub orders: Vec<OrderView>,
}

/// Display the order history page.
///
/// Orders are queried from the content backend by the signed-in customer's
/// Clerk user id, newest first.
#[instrument(skip(state, customer))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = state.content().get_orders_for_user(&customer.id).await?;

    Ok(OrdersTemplate {
        customer_name: customer.name.clone().unwrap_or_default(),
        orders: orders.iter().map(OrderView::from).collect(),
    })
}
