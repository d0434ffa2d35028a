use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};

use crate::{
    dto::coupons::{ApplyCouponRequest, CouponApplied},
    error::AppResult,
    middleware::session::VisitorSession,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/apply", post(apply_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons/apply",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Coupon applied, or cleared when the code is not valid", body = ApiResponse<CouponApplied>),
    ),
    tag = "Coupons"
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    mut visitor: VisitorSession,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<(HeaderMap, Json<ApiResponse<CouponApplied>>)> {
    let response = cart_service::apply_coupon_code(&state, &mut visitor.0, payload).await?;
    let headers = visitor.commit(&state).await?;
    Ok((headers, Json(response)))
}
