use session_cart::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    services::session_store::DbSessionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let purged = DbSessionStore::new(orm, config.session_ttl_secs)
        .purge_expired()
        .await?;
    println!("Migrations applied, {purged} expired sessions removed");
    Ok(())
}
