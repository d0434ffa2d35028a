use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Coupon, Product},
};

/// Read access to the product catalog.
pub trait Catalog {
    /// Fails with `AppError::NotFound` when no such product exists.
    async fn product_by_id(&self, id: Uuid) -> AppResult<Product>;

    /// Batched lookup. Unknown ids are skipped, not reported.
    async fn products_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;
}

/// Read access to discount coupons.
pub trait CouponLookup {
    /// Fails with `AppError::NotFound` when no such coupon exists.
    async fn coupon_by_id(&self, id: Uuid) -> AppResult<Coupon>;

    /// Case-insensitive code match restricted to coupons that are active and
    /// valid at `now`; anything else is `AppError::NotFound`.
    async fn coupon_by_code(&self, code: &str, now: DateTime<Utc>) -> AppResult<Coupon>;
}
