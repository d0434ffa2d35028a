use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use session_cart::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, run_migrations},
    entity::{
        coupons::{self, Entity as Coupons},
        products::{self, Entity as Products},
    },
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let products = seed_products(&orm).await?;
    seed_coupons(&orm).await?;

    println!("Seed completed. {products} products available");
    Ok(())
}

async fn seed_products(orm: &OrmConn) -> anyhow::Result<usize> {
    let samples = [
        ("Green tea", "Loose leaf, 100g", Decimal::new(1000, 2), 50),
        ("Black tea", "Loose leaf, 100g", Decimal::new(850, 2), 40),
        ("Red tea", "Rooibos blend, 100g", Decimal::new(500, 2), 25),
        ("Tea pot", "Cast iron, 0.8l", Decimal::new(4599, 2), 5),
    ];

    let mut inserted = 0;
    for (name, description, price, stock) in samples {
        let existing = Products::find()
            .filter(products::Column::Name.eq(name))
            .one(orm)
            .await?;
        if existing.is_some() {
            continue;
        }
        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            price: Set(price),
            stock: Set(stock),
            available: Set(true),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
        inserted += 1;
    }

    let total = Products::find().all(orm).await?.len();
    println!("Inserted {inserted} products");
    Ok(total)
}

async fn seed_coupons(orm: &OrmConn) -> anyhow::Result<()> {
    let now = Utc::now();
    let samples = [("WELCOME10", 10), ("SUMMER25", 25)];

    for (code, discount_percent) in samples {
        let coupon = coupons::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            valid_from: Set(now.into()),
            valid_to: Set((now + Duration::days(90)).into()),
            discount_percent: Set(discount_percent),
            active: Set(true),
        };
        Coupons::insert(coupon)
            .on_conflict(
                OnConflict::column(coupons::Column::Code)
                    .update_columns([coupons::Column::ValidTo, coupons::Column::Active])
                    .to_owned(),
            )
            .exec_without_returning(orm)
            .await?;
    }

    println!("Coupons ready: WELCOME10, SUMMER25");
    Ok(())
}
