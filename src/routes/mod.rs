use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod testimonials;
pub mod users;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/customer", orders::customer_router())
        .nest("/cart", cart::router())
        .nest("/auth", auth::router())
        .nest("/testimonials", testimonials::router())
        .nest("/admin", admin::router())
        .nest("/users", users::router())
}
