//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Cart and box (same handlers, two mounts)
//! GET  /cart                   - Current items and totals
//! POST /cart/add               - Add item (merges by product id)
//! POST /cart/remove            - Remove item by id
//! POST /cart/update            - Adjust quantity by delta (clamped at 1)
//! POST /cart/increase          - Quantity +1
//! POST /cart/decrease          - Quantity -1 (removes at 1)
//! POST /cart/clear             - Empty items, reset the sync guard
//! GET  /cart/count             - Item-count badge
//! ...and the same under /box, plus:
//! POST /box/checkout           - Priced order summary with surcharge
//!
//! # Auth
//! POST /auth/register          - Create account (signs in, reconciles)
//! POST /auth/login             - Password login (reconciles session items)
//! POST /auth/logout            - Clear identity from session
//! GET  /account                - Current account (requires auth)
//! ```

pub mod auth;
pub mod cart;

use axum::{
    Extension, Router,
    routing::{get, post},
};

use satchel_core::CartKind;

use crate::state::AppState;

/// Create the routes shared by the cart and the box.
///
/// The kind is injected as an extension so one set of handlers serves both
/// mounts; the box additionally gets the checkout summary route.
pub fn cart_routes(kind: CartKind) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/update", post(cart::update))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count));

    let router = if kind == CartKind::Box {
        router.route("/checkout", post(cart::checkout))
    } else {
        router
    };

    router.layer(Extension(kind))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes(CartKind::Cart))
        .nest("/box", cart_routes(CartKind::Box))
        .nest("/auth", auth_routes())
        .route("/account", get(auth::me))
}
