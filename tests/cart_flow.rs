use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, Statement};
use serial_test::serial;
use session_cart::{
    cart::Cart,
    config::{AppConfig, DEFAULT_SESSION_TTL_SECS},
    db::{create_orm_conn, run_migrations},
    dto::{cart::AddToCartRequest, coupons::ApplyCouponRequest},
    entity::{coupons::ActiveModel as CouponActive, products::ActiveModel as ProductActive},
    services::cart_service,
    session::SessionStore,
    state::AppState,
};
use uuid::Uuid;

// Integration flow: visitor fills a cart across requests, applies a coupon, and empties it.
#[tokio::test]
#[serial]
async fn session_cart_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let widget = create_product(&state.orm, "Test Widget", Decimal::new(1000, 2)).await?;
    let gadget = create_product(&state.orm, "Test Gadget", Decimal::new(500, 2)).await?;
    create_coupon(&state.orm, "TEN", 10, true).await?;

    // First request: add two widgets to a brand new session.
    let mut session = state.sessions.load(None).await?;
    let added = cart_service::add_to_cart(
        &state,
        &mut session,
        AddToCartRequest {
            product_id: widget,
            quantity: 2,
            update_quantity: false,
        },
    )
    .await?;
    assert_eq!(added.data.as_ref().map(|d| d.total_items), Some(2));
    assert!(session.is_modified());
    state.sessions.save(&session).await?;
    let key = session.key().to_string();

    // Second request: same visitor adds a gadget.
    let mut session = state.sessions.load(Some(&key)).await?;
    assert_eq!(session.key(), key);
    let detail = cart_service::add_to_cart(
        &state,
        &mut session,
        AddToCartRequest {
            product_id: gadget,
            quantity: 1,
            update_quantity: false,
        },
    )
    .await?
    .data
    .expect("cart detail");
    assert_eq!(detail.total_items, 3);
    assert_eq!(detail.total_price, Decimal::new(2500, 2));
    assert_eq!(detail.items[0].product_id, widget);
    assert_eq!(detail.items[1].product_id, gadget);
    state.sessions.save(&session).await?;

    // Catalog price changes do not reach the cart.
    state
        .orm
        .execute(Statement::from_string(
            state.orm.get_database_backend(),
            format!("UPDATE products SET price = 99.00 WHERE id = '{widget}'"),
        ))
        .await?;

    let mut session = state.sessions.load(Some(&key)).await?;
    let applied = cart_service::apply_coupon_code(
        &state,
        &mut session,
        ApplyCouponRequest { code: "ten".into() },
    )
    .await?
    .data
    .expect("coupon result");
    assert!(applied.applied);

    let detail = cart_service::cart_detail(&state, &mut session)
        .await?
        .data
        .expect("cart detail");
    assert_eq!(detail.total_price, Decimal::new(2500, 2));
    assert_eq!(detail.discount, Decimal::new(250, 2));
    assert_eq!(detail.total_price_after_discount, Decimal::new(2250, 2));
    state.sessions.save(&session).await?;

    // Removing and clearing.
    let mut session = state.sessions.load(Some(&key)).await?;
    let detail = cart_service::remove_from_cart(&state, &mut session, gadget)
        .await?
        .data
        .expect("cart detail");
    assert_eq!(detail.total_items, 2);

    let detail = cart_service::clear_cart(&state, &mut session)
        .await?
        .data
        .expect("cart detail");
    assert_eq!(detail.total_items, 0);
    assert!(detail.items.is_empty());
    assert!(!session.contains_key("cart"));

    Ok(())
}

#[tokio::test]
#[serial]
async fn unknown_and_expired_sessions_start_fresh() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let unknown = state.sessions.load(Some("does-not-exist")).await?;
    assert!(unknown.is_new());
    assert_ne!(unknown.key(), "does-not-exist");

    let mut session = state.sessions.load(None).await?;
    Cart::new(&mut session, &state.cart)?;
    state.sessions.save(&session).await?;
    state
        .orm
        .execute(Statement::from_string(
            state.orm.get_database_backend(),
            format!(
                "UPDATE sessions SET expire_date = NOW() - INTERVAL '1 day' WHERE session_key = '{}'",
                session.key()
            ),
        ))
        .await?;

    let reloaded = state.sessions.load(Some(session.key())).await?;
    assert!(reloaded.is_new());
    assert_eq!(state.sessions.purge_expired().await?, 1);

    Ok(())
}

#[tokio::test]
#[serial]
async fn expired_coupon_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    create_coupon(&state.orm, "OLD", 50, false).await?;

    let mut session = state.sessions.load(None).await?;
    let result = cart_service::apply_coupon_code(
        &state,
        &mut session,
        ApplyCouponRequest { code: "OLD".into() },
    )
    .await?
    .data
    .expect("coupon result");
    assert!(!result.applied);
    assert!(!session.contains_key("coupon_id"));

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run cart flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE sessions, coupons, products",
    ))
    .await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 3000,
        cart_session_id: "cart".into(),
        session_cookie_name: "sessionid".into(),
        session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
    };
    Ok(Some(AppState::new(orm, &config)))
}

async fn create_product(
    orm: &DatabaseConnection,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        stock: Set(10),
        available: Set(true),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(product.id)
}

async fn create_coupon(
    orm: &DatabaseConnection,
    code: &str,
    discount_percent: i32,
    valid: bool,
) -> anyhow::Result<Uuid> {
    let now = Utc::now();
    let valid_to = if valid {
        now + Duration::days(1)
    } else {
        now - Duration::hours(1)
    };
    let coupon = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code.into()),
        valid_from: Set((now - Duration::days(2)).into()),
        valid_to: Set(valid_to.into()),
        discount_percent: Set(discount_percent),
        active: Set(true),
    }
    .insert(orm)
    .await?;
    Ok(coupon.id)
}
