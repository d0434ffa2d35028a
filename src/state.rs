use crate::{
    cart::CartSettings, config::AppConfig, db::OrmConn, services::session_store::DbSessionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub sessions: DbSessionStore,
    pub cart: CartSettings,
    pub session_cookie: String,
}

impl AppState {
    pub fn new(orm: OrmConn, config: &AppConfig) -> Self {
        Self {
            sessions: DbSessionStore::new(orm.clone(), config.session_ttl_secs),
            orm,
            cart: config.cart_settings(),
            session_cookie: config.session_cookie_name.clone(),
        }
    }
}
