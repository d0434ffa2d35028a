use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{cart::CartItem, models::Coupon};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Replace the current quantity instead of adding to it.
    #[serde(default)]
    pub update_quantity: bool,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartDetail {
    pub items: Vec<CartItem>,
    pub total_items: u64,
    #[schema(value_type = String, example = "25.00")]
    pub total_price: Decimal,
    pub coupon: Option<Coupon>,
    #[schema(value_type = String, example = "2.50")]
    pub discount: Decimal,
    #[schema(value_type = String, example = "22.50")]
    pub total_price_after_discount: Decimal,
}
