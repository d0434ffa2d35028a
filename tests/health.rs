use axum::extract::State;
use sea_orm::DatabaseConnection;
use session_cart::{
    config::{AppConfig, DEFAULT_SESSION_TTL_SECS},
    routes::health::health_check,
    state::AppState,
};

#[tokio::test]
async fn health_check_reports_missing_database() {
    let config = AppConfig {
        database_url: String::new(),
        host: "127.0.0.1".into(),
        port: 3000,
        cart_session_id: "cart".into(),
        session_cookie_name: "sessionid".into(),
        session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
    };
    let state = AppState::new(DatabaseConnection::Disconnected, &config);

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "degraded");
    assert_eq!(data.database, "unavailable");
}
