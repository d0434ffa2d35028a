use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    cart::Catalog,
    db::OrmConn,
    entity::products::{Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
};

/// Product catalog backed by the `products` table.
#[derive(Debug, Clone, Copy)]
pub struct ProductCatalog<'a> {
    orm: &'a OrmConn,
}

impl<'a> ProductCatalog<'a> {
    pub fn new(orm: &'a OrmConn) -> Self {
        Self { orm }
    }
}

impl Catalog for ProductCatalog<'_> {
    async fn product_by_id(&self, id: Uuid) -> AppResult<Product> {
        let result = Products::find_by_id(id)
            .one(self.orm)
            .await?
            .map(product_from_entity);
        match result {
            Some(p) => Ok(p),
            None => Err(AppError::NotFound),
        }
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let products = Products::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(products)
    }
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        available: model.available,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
