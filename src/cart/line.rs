use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// One product's quantity and the price it had when first added.
///
/// Stored in the session as `{"quantity": 2, "price": "10.00"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl CartLine {
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A cart line joined with the live catalog product, built fresh on every
/// iteration and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartItem {
    pub product_id: Uuid,
    /// `None` when the product has since left the catalog.
    pub product: Option<Product>,
    pub quantity: u32,
    /// Snapshot taken at add time, not the current catalog price.
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
    #[schema(value_type = String, example = "20.00")]
    pub total_price: Decimal,
}

impl CartItem {
    pub(crate) fn new(product_id: Uuid, line: CartLine, product: Option<Product>) -> Self {
        Self {
            product_id,
            product,
            quantity: line.quantity,
            price: line.price,
            total_price: line.total_price(),
        }
    }
}
