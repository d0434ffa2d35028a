use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    cart::{Cart, CouponLookup},
    db::OrmConn,
    entity::coupons::{Column, Entity as Coupons, Model as CouponModel},
    error::{AppError, AppResult},
    models::Coupon,
};

/// Coupon lookups backed by the `coupons` table.
#[derive(Debug, Clone, Copy)]
pub struct CouponStore<'a> {
    orm: &'a OrmConn,
}

impl<'a> CouponStore<'a> {
    pub fn new(orm: &'a OrmConn) -> Self {
        Self { orm }
    }
}

impl CouponLookup for CouponStore<'_> {
    async fn coupon_by_id(&self, id: Uuid) -> AppResult<Coupon> {
        Coupons::find_by_id(id)
            .one(self.orm)
            .await?
            .map(coupon_from_entity)
            .ok_or(AppError::NotFound)
    }

    async fn coupon_by_code(&self, code: &str, now: DateTime<Utc>) -> AppResult<Coupon> {
        let now: DateTime<FixedOffset> = now.into();
        Coupons::find()
            .filter(Expr::expr(Func::lower(Expr::col(Column::Code))).eq(code.trim().to_lowercase()))
            .filter(Column::ValidFrom.lte(now))
            .filter(Column::ValidTo.gte(now))
            .filter(Column::Active.eq(true))
            .one(self.orm)
            .await?
            .map(coupon_from_entity)
            .ok_or(AppError::NotFound)
    }
}

/// Outcome of a coupon application attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponApplication {
    Applied(Coupon),
    Rejected,
}

/// Looks `code` up and stores the matching coupon on the cart. An unknown,
/// inactive or expired code clears whatever coupon was applied before.
pub async fn apply_coupon<L: CouponLookup>(
    cart: &mut Cart<'_>,
    coupons: &L,
    code: &str,
    now: DateTime<Utc>,
) -> AppResult<CouponApplication> {
    match coupons.coupon_by_code(code, now).await {
        Ok(coupon) => {
            cart.set_coupon(Some(coupon.id));
            tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "coupon applied");
            Ok(CouponApplication::Applied(coupon))
        }
        Err(AppError::NotFound) => {
            cart.set_coupon(None);
            tracing::info!(code = %code, "coupon rejected");
            Ok(CouponApplication::Rejected)
        }
        Err(err) => Err(err),
    }
}

pub(crate) fn coupon_from_entity(model: CouponModel) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        valid_from: model.valid_from.with_timezone(&Utc),
        valid_to: model.valid_to.with_timezone(&Utc),
        discount_percent: model.discount_percent,
        active: model.active,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::Map;

    use super::*;
    use crate::{cart::CartSettings, session::Session};

    struct FixedCoupons(Vec<Coupon>);

    impl CouponLookup for FixedCoupons {
        async fn coupon_by_id(&self, id: Uuid) -> AppResult<Coupon> {
            self.0
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or(AppError::NotFound)
        }

        async fn coupon_by_code(&self, code: &str, now: DateTime<Utc>) -> AppResult<Coupon> {
            self.0
                .iter()
                .find(|c| c.code.eq_ignore_ascii_case(code.trim()) && c.is_valid_at(now))
                .cloned()
                .ok_or(AppError::NotFound)
        }
    }

    fn coupon(code: &str, active: bool) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            code: code.into(),
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(1),
            discount_percent: 15,
            active,
        }
    }

    #[tokio::test]
    async fn valid_code_is_stored_on_cart() -> anyhow::Result<()> {
        let settings = CartSettings::default();
        let mut session = Session::from_stored("abc", Map::new());
        let summer = coupon("SUMMER", true);
        let coupons = FixedCoupons(vec![summer.clone()]);

        let mut cart = Cart::new(&mut session, &settings)?;
        let outcome = apply_coupon(&mut cart, &coupons, "summer", Utc::now()).await?;
        assert_eq!(outcome, CouponApplication::Applied(summer.clone()));
        assert_eq!(cart.coupon_id(), Some(summer.id));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_code_clears_previous_coupon() -> anyhow::Result<()> {
        let settings = CartSettings::default();
        let mut session = Session::from_stored("abc", Map::new());
        let summer = coupon("SUMMER", true);
        let retired = coupon("OLD", false);
        let coupons = FixedCoupons(vec![summer.clone(), retired]);

        let mut cart = Cart::new(&mut session, &settings)?;
        apply_coupon(&mut cart, &coupons, "SUMMER", Utc::now()).await?;
        let outcome = apply_coupon(&mut cart, &coupons, "OLD", Utc::now()).await?;
        assert_eq!(outcome, CouponApplication::Rejected);
        assert_eq!(cart.coupon_id(), None);
        drop(cart);
        assert!(!session.contains_key("coupon_id"));
        Ok(())
    }

    #[test]
    fn coupon_validity_window_is_inclusive() {
        let c = coupon("X", true);
        assert!(c.is_valid_at(c.valid_from));
        assert!(c.is_valid_at(c.valid_to));
        assert!(!c.is_valid_at(c.valid_to + Duration::seconds(1)));
    }
}
