use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartItem,
    dto::{
        cart::{AddToCartRequest, CartDetail},
        coupons::{ApplyCouponRequest, CouponApplied},
    },
    models::{Coupon, Product},
    response::{ApiResponse, Meta},
    routes::{cart, coupons, health},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::cart_detail,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        coupons::apply_coupon
    ),
    components(
        schemas(
            Product,
            Coupon,
            CartItem,
            CartDetail,
            AddToCartRequest,
            ApplyCouponRequest,
            CouponApplied,
            health::HealthData,
            Meta,
            ApiResponse<CartDetail>,
            ApiResponse<CouponApplied>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Coupons", description = "Coupon endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
