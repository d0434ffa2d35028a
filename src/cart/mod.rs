//! Session-backed shopping cart.
//!
//! The cart lives inside the visitor's [`Session`] as an ordered JSON object
//! keyed by product id. [`Cart`] decodes it once on construction into typed
//! [`CartLine`]s and re-encodes the whole mapping on every mutation, so the
//! session only ever sees strings for prices.

mod line;
mod lookup;

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, de::Error as _};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Coupon, Product},
    session::Session,
};

pub use line::{CartItem, CartLine};
pub use lookup::{Catalog, CouponLookup};

/// Session keys the cart reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    pub session_key: String,
    pub coupon_key: String,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            session_key: "cart".to_string(),
            coupon_key: "coupon_id".to_string(),
        }
    }
}

/// A visitor's cart, bound to their session for the span of one request.
#[derive(Debug)]
pub struct Cart<'a> {
    session: &'a mut Session,
    settings: &'a CartSettings,
    lines: Vec<(Uuid, CartLine)>,
    coupon_id: Option<Uuid>,
}

impl<'a> Cart<'a> {
    /// Binds to `session`, creating an empty cart entry if there is none yet.
    pub fn new(session: &'a mut Session, settings: &'a CartSettings) -> AppResult<Self> {
        let lines = match session.get(&settings.session_key) {
            Some(stored) if !stored.is_null() => decode_lines(stored)?,
            _ => {
                session.insert(settings.session_key.clone(), Value::Object(Map::new()));
                Vec::new()
            }
        };
        let coupon_id = session
            .get_as::<Option<Uuid>>(&settings.coupon_key)?
            .flatten();

        Ok(Self {
            session,
            settings,
            lines,
            coupon_id,
        })
    }

    /// Adds `quantity` units of `product`, or sets the quantity outright when
    /// `update_quantity` is true. A product seen for the first time has its
    /// current catalog price captured.
    pub fn add(&mut self, product: &Product, quantity: u32, update_quantity: bool) -> AppResult<()> {
        if quantity == 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }

        let index = match self.position(product.id) {
            Some(index) => index,
            None => {
                self.lines.push((
                    product.id,
                    CartLine {
                        quantity: 0,
                        price: product.price,
                    },
                ));
                self.lines.len() - 1
            }
        };

        let line = &mut self.lines[index].1;
        line.quantity = if update_quantity {
            quantity
        } else {
            line.quantity
                .checked_add(quantity)
                .ok_or_else(|| AppError::BadRequest("quantity is too large".to_string()))?
        };
        tracing::debug!(
            product_id = %product.id,
            quantity = line.quantity,
            update_quantity,
            "cart line updated"
        );

        self.save()
    }

    /// Drops the line for `product`. Returns whether anything was removed; the
    /// session is left untouched when it was not in the cart.
    pub fn remove(&mut self, product: &Product) -> AppResult<bool> {
        self.remove_by_id(product.id)
    }

    /// Same as [`Cart::remove`], for lines whose product may no longer be in
    /// the catalog.
    pub fn remove_by_id(&mut self, product_id: Uuid) -> AppResult<bool> {
        let Some(index) = self.position(product_id) else {
            return Ok(false);
        };
        self.lines.remove(index);
        tracing::debug!(%product_id, "cart line removed");
        self.save()?;
        Ok(true)
    }

    /// Enriched lines in insertion order. Resolves every product with a single
    /// catalog call; each call re-reads the cart and re-queries the catalog.
    pub async fn items<C: Catalog>(&self, catalog: &C) -> AppResult<CartItems> {
        let ids: Vec<Uuid> = self.lines.iter().map(|(id, _)| *id).collect();
        let products = if ids.is_empty() {
            Vec::new()
        } else {
            catalog.products_by_ids(&ids).await?
        };

        Ok(CartItems {
            lines: self.lines.clone().into_iter(),
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        })
    }

    /// Total number of units, not the number of lines.
    pub fn len(&self) -> u64 {
        self.lines
            .iter()
            .map(|(_, line)| u64::from(line.quantity))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|(id, _)| *id == product_id)
            .map(|(_, line)| line)
    }

    /// Sum over the snapshot prices.
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(|(_, line)| line.total_price()).sum()
    }

    /// Removes the cart from the session altogether.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.session.remove(&self.settings.session_key);
        self.session.mark_modified();
        tracing::debug!("cart cleared");
    }

    pub fn coupon_id(&self) -> Option<Uuid> {
        self.coupon_id
    }

    /// Stores or forgets the coupon the visitor applied.
    pub fn set_coupon(&mut self, coupon_id: Option<Uuid>) {
        match coupon_id {
            Some(id) => self
                .session
                .insert(self.settings.coupon_key.clone(), Value::String(id.to_string())),
            None => {
                self.session.remove(&self.settings.coupon_key);
            }
        }
        self.session.mark_modified();
        self.coupon_id = coupon_id;
    }

    /// Resolves the stored coupon id. A stale id surfaces as the lookup's
    /// `NotFound`.
    pub async fn coupon<L: CouponLookup>(&self, coupons: &L) -> AppResult<Option<Coupon>> {
        match self.coupon_id {
            Some(id) => coupons.coupon_by_id(id).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn discount<L: CouponLookup>(&self, coupons: &L) -> AppResult<Decimal> {
        Ok(match self.coupon(coupons).await? {
            Some(coupon) => discount_for(&coupon, self.total_price()),
            None => Decimal::ZERO,
        })
    }

    pub async fn total_price_after_discount<L: CouponLookup>(
        &self,
        coupons: &L,
    ) -> AppResult<Decimal> {
        let discount = self.discount(coupons).await?;
        Ok(self.total_price() - discount)
    }

    fn position(&self, product_id: Uuid) -> Option<usize> {
        self.lines.iter().position(|(id, _)| *id == product_id)
    }

    fn save(&mut self) -> AppResult<()> {
        let encoded = encode_lines(&self.lines)?;
        self.session
            .insert(self.settings.session_key.clone(), encoded);
        Ok(())
    }
}

/// `discount_percent / 100 * total`, unrounded.
pub fn discount_for(coupon: &Coupon, total: Decimal) -> Decimal {
    Decimal::from(coupon.discount_percent) / Decimal::ONE_HUNDRED * total
}

/// Lazily built [`CartItem`]s returned by [`Cart::items`].
#[derive(Debug)]
pub struct CartItems {
    lines: std::vec::IntoIter<(Uuid, CartLine)>,
    products: HashMap<Uuid, Product>,
}

impl Iterator for CartItems {
    type Item = CartItem;

    fn next(&mut self) -> Option<CartItem> {
        let (id, line) = self.lines.next()?;
        Some(CartItem::new(id, line, self.products.remove(&id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.lines.size_hint()
    }
}

impl ExactSizeIterator for CartItems {}

fn decode_lines(stored: &Value) -> AppResult<Vec<(Uuid, CartLine)>> {
    let Value::Object(map) = stored else {
        return Err(serde_json::Error::custom("cart entry is not an object").into());
    };
    map.iter()
        .map(|(key, value)| -> AppResult<(Uuid, CartLine)> {
            let id = Uuid::parse_str(key).map_err(|err| {
                serde_json::Error::custom(format!("invalid product id {key:?}: {err}"))
            })?;
            let line = CartLine::deserialize(value)?;
            Ok((id, line))
        })
        .collect()
}

fn encode_lines(lines: &[(Uuid, CartLine)]) -> AppResult<Value> {
    let mut map = Map::with_capacity(lines.len());
    for (id, line) in lines {
        map.insert(id.to_string(), serde_json::to_value(line)?);
    }
    Ok(Value::Object(map))
}
