use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartDetail},
    error::AppResult,
    middleware::session::VisitorSession,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_detail).post(add_to_cart).delete(clear_cart))
        .route("/{product_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart of the current visitor", body = ApiResponse<CartDetail>)
    ),
    tag = "Cart"
)]
pub async fn cart_detail(
    State(state): State<AppState>,
    mut visitor: VisitorSession,
) -> AppResult<(HeaderMap, Json<ApiResponse<CartDetail>>)> {
    let response = cart_service::cart_detail(&state, &mut visitor.0).await?;
    let headers = visitor.commit(&state).await?;
    Ok((headers, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add a product or update its quantity", body = ApiResponse<CartDetail>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    mut visitor: VisitorSession,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<(HeaderMap, Json<ApiResponse<CartDetail>>)> {
    let response = cart_service::add_to_cart(&state, &mut visitor.0, payload).await?;
    let headers = visitor.commit(&state).await?;
    Ok((headers, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<CartDetail>),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    mut visitor: VisitorSession,
    Path(product_id): Path<Uuid>,
) -> AppResult<(HeaderMap, Json<ApiResponse<CartDetail>>)> {
    let response = cart_service::remove_from_cart(&state, &mut visitor.0, product_id).await?;
    let headers = visitor.commit(&state).await?;
    Ok((headers, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartDetail>),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    mut visitor: VisitorSession,
) -> AppResult<(HeaderMap, Json<ApiResponse<CartDetail>>)> {
    let response = cart_service::clear_cart(&state, &mut visitor.0).await?;
    let headers = visitor.commit(&state).await?;
    Ok((headers, Json(response)))
}
