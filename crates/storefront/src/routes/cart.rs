//! Cart and box route handlers.
//!
//! One set of handlers serves both mounts; the [`CartKind`] extension says
//! which collection a request addresses. Responses carry the full item
//! list and totals so clients never recompute prices. Adds answer with an
//! `HX-Trigger` header so count badges can refresh without polling.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use satchel_core::{Cart, CartKind, LineItem, ProductId};

use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentAccount, SessionState};
use crate::services::CartService;
use crate::state::AppState;

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub kind: CartKind,
    pub items: Vec<LineItem>,
    pub total_quantity: u64,
    pub total_price: Decimal,
}

impl CartView {
    fn new(kind: CartKind, cart: &Cart) -> Self {
        Self {
            kind,
            items: cart.items().to_vec(),
            total_quantity: cart.total_quantity(),
            total_price: cart.total_price(),
        }
    }
}

/// Item-count badge data.
#[derive(Debug, Clone, Serialize)]
pub struct CountView {
    pub count: u64,
}

/// Priced order summary returned by box checkout.
///
/// Order creation against the commerce platform happens downstream; this
/// endpoint only prices the bundle, applying the configured surcharge to
/// the subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummaryView {
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub surcharge_rate: Decimal,
    pub surcharge: Decimal,
    pub total: Decimal,
}

/// Add item request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    pub quantity: Option<u32>,
    pub image: Option<String>,
}

/// Request body addressing one item by id.
#[derive(Debug, Deserialize)]
pub struct ItemRef {
    pub id: String,
}

/// Quantity adjustment request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub id: String,
    pub delta: i64,
}

fn account_id(account: Option<&CurrentAccount>) -> Option<satchel_core::AccountId> {
    account.map(|a| a.id)
}

/// Current items and totals.
#[instrument(skip(state, session, account))]
pub async fn show(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
) -> Json<CartView> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);
    let cart = service.load().await;
    Json(CartView::new(kind, &cart))
}

/// Add an item.
///
/// Validates the submitted fields, merges by product id, and answers with
/// the updated view plus an `HX-Trigger` header while the just-added
/// marker is live.
#[instrument(skip(state, session, account, request))]
pub async fn add(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Response> {
    let item = validate_item(request)?;

    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);

    let mut cart = service.load().await;
    cart.add(item);
    service.save(&cart).await;

    let view = Json(CartView::new(kind, &cart));
    if cart.take_just_added() {
        Ok((AppendHeaders([("HX-Trigger", "cart-updated")]), view).into_response())
    } else {
        Ok(view.into_response())
    }
}

/// Remove an item by id. No-op if absent.
#[instrument(skip(state, session, account))]
pub async fn remove(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
    Json(request): Json<ItemRef>,
) -> Result<Json<CartView>> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);

    let mut cart = service.load().await;
    cart.remove(&ProductId::new(request.id));
    service.save(&cart).await;

    Ok(Json(CartView::new(kind, &cart)))
}

/// Adjust an item's quantity by a signed delta, clamped at 1.
#[instrument(skip(state, session, account))]
pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);

    let mut cart = service.load().await;
    cart.update_quantity(&ProductId::new(request.id), request.delta);
    service.save(&cart).await;

    Ok(Json(CartView::new(kind, &cart)))
}

/// Increase an item's quantity by one.
#[instrument(skip(state, session, account))]
pub async fn increase(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
    Json(request): Json<ItemRef>,
) -> Result<Json<CartView>> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);

    let mut cart = service.load().await;
    cart.increase(&ProductId::new(request.id));
    service.save(&cart).await;

    Ok(Json(CartView::new(kind, &cart)))
}

/// Decrease an item's quantity by one; removes the item at quantity 1.
#[instrument(skip(state, session, account))]
pub async fn decrease(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
    Json(request): Json<ItemRef>,
) -> Result<Json<CartView>> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);

    let mut cart = service.load().await;
    cart.decrease(&ProductId::new(request.id));
    service.save(&cart).await;

    Ok(Json(CartView::new(kind, &cart)))
}

/// Empty the collection.
///
/// Also removes the session-stored value and resets the reconciliation
/// guard so a future sign-in can merge again.
#[instrument(skip(state, session, account))]
pub async fn clear(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
) -> Result<Json<CartView>> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);

    let mut cart = service.load().await;
    cart.clear();
    service.save(&cart).await;
    service.clear_local().await?;

    let mut session_state = SessionState::load(&session).await;
    if session_state.cart_synced {
        session_state.cart_synced = false;
        session_state.save(&session).await?;
    }

    Ok(Json(CartView::new(kind, &cart)))
}

/// Item-count badge.
#[instrument(skip(state, session, account))]
pub async fn count(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
) -> Json<CountView> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);
    let cart = service.load().await;

    Json(CountView {
        count: cart.total_quantity(),
    })
}

/// Price the box for order creation.
///
/// Applies the configured surcharge to the subtotal. Rejects an empty box.
#[instrument(skip(state, session, account))]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(kind): Extension<CartKind>,
    OptionalAuth(account): OptionalAuth,
    session: Session,
) -> Result<(StatusCode, Json<OrderSummaryView>)> {
    let repo = CartRepository::new(state.pool());
    let service = CartService::new(&session, &repo, account_id(account.as_ref()), kind);
    let cart = service.load().await;

    if cart.is_empty() {
        return Err(AppError::BadRequest("box is empty".to_string()));
    }

    let rate = state.config().box_surcharge_rate;
    let subtotal = cart.total_price();
    let surcharge = cart.surcharge(rate);

    Ok((
        StatusCode::CREATED,
        Json(OrderSummaryView {
            items: cart.into_items(),
            subtotal,
            surcharge_rate: rate,
            surcharge,
            total: subtotal + surcharge,
        }),
    ))
}

fn validate_item(request: AddItemRequest) -> Result<LineItem> {
    if request.id.trim().is_empty() {
        return Err(AppError::BadRequest("product id is required".to_string()));
    }
    if request.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    if request.price < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "price must not be negative".to_string(),
        ));
    }
    if let Some(image) = &request.image
        && url::Url::parse(image).is_err()
    {
        return Err(AppError::BadRequest("image must be a valid URL".to_string()));
    }

    Ok(LineItem {
        id: ProductId::new(request.id),
        title: request.title,
        quantity: request.quantity.unwrap_or(1),
        price: request.price,
        image: request.image,
    })
}
