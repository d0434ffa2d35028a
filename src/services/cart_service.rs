use chrono::Utc;
use uuid::Uuid;

use crate::{
    cart::{Cart, Catalog, CouponLookup, discount_for},
    dto::{
        cart::{AddToCartRequest, CartDetail},
        coupons::{ApplyCouponRequest, CouponApplied},
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::{
        catalog_service::ProductCatalog,
        coupon_service::{CouponApplication, CouponStore, apply_coupon},
    },
    session::Session,
    state::AppState,
};

pub async fn cart_detail(
    state: &AppState,
    session: &mut Session,
) -> AppResult<ApiResponse<CartDetail>> {
    let mut cart = Cart::new(session, &state.cart)?;
    let detail = build_detail(
        &mut cart,
        &ProductCatalog::new(&state.orm),
        &CouponStore::new(&state.orm),
    )
    .await?;
    Ok(respond("Cart", detail))
}

pub async fn add_to_cart(
    state: &AppState,
    session: &mut Session,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartDetail>> {
    let catalog = ProductCatalog::new(&state.orm);
    let product = catalog.product_by_id(payload.product_id).await?;

    let mut cart = Cart::new(session, &state.cart)?;
    cart.add(&product, payload.quantity, payload.update_quantity)?;

    let detail = build_detail(&mut cart, &catalog, &CouponStore::new(&state.orm)).await?;
    Ok(respond("Added to cart", detail))
}

pub async fn remove_from_cart(
    state: &AppState,
    session: &mut Session,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartDetail>> {
    let mut cart = Cart::new(session, &state.cart)?;
    let removed = cart.remove_by_id(product_id)?;

    let detail = build_detail(
        &mut cart,
        &ProductCatalog::new(&state.orm),
        &CouponStore::new(&state.orm),
    )
    .await?;
    let message = if removed {
        "Removed from cart"
    } else {
        "Product was not in cart"
    };
    Ok(respond(message, detail))
}

pub async fn clear_cart(
    state: &AppState,
    session: &mut Session,
) -> AppResult<ApiResponse<CartDetail>> {
    let mut cart = Cart::new(session, &state.cart)?;
    cart.clear();

    let detail = build_detail(
        &mut cart,
        &ProductCatalog::new(&state.orm),
        &CouponStore::new(&state.orm),
    )
    .await?;
    Ok(respond("Cart cleared", detail))
}

pub async fn apply_coupon_code(
    state: &AppState,
    session: &mut Session,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<CouponApplied>> {
    let mut cart = Cart::new(session, &state.cart)?;
    let outcome = apply_coupon(
        &mut cart,
        &CouponStore::new(&state.orm),
        &payload.code,
        Utc::now(),
    )
    .await?;

    let (message, data) = match outcome {
        CouponApplication::Applied(coupon) => (
            "Coupon applied",
            CouponApplied {
                applied: true,
                coupon: Some(coupon),
            },
        ),
        CouponApplication::Rejected => (
            "Coupon is not valid",
            CouponApplied {
                applied: false,
                coupon: None,
            },
        ),
    };
    Ok(ApiResponse::success(message, data, Some(Meta::empty())))
}

/// Snapshot of the cart for the response body. Resolves the coupon once and
/// reuses it for the discount; a coupon that no longer exists is dropped from
/// the session instead of failing the request.
pub async fn build_detail<C: Catalog, L: CouponLookup>(
    cart: &mut Cart<'_>,
    catalog: &C,
    coupons: &L,
) -> AppResult<CartDetail> {
    let items = cart.items(catalog).await?.collect();
    let total_price = cart.total_price();
    let coupon = match cart.coupon(coupons).await {
        Ok(coupon) => coupon,
        Err(AppError::NotFound) => {
            tracing::warn!(coupon_id = ?cart.coupon_id(), "dropping stale coupon");
            cart.set_coupon(None);
            None
        }
        Err(err) => return Err(err),
    };
    let discount = coupon
        .as_ref()
        .map(|c| discount_for(c, total_price))
        .unwrap_or_default();

    Ok(CartDetail {
        items,
        total_items: cart.len(),
        total_price,
        coupon,
        discount,
        total_price_after_discount: total_price - discount,
    })
}

fn respond(message: &str, detail: CartDetail) -> ApiResponse<CartDetail> {
    let total = i64::try_from(detail.total_items).unwrap_or(i64::MAX);
    ApiResponse::success(message, detail, Some(Meta::with_total(total)))
}
