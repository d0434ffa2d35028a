use std::env;

use crate::cart::CartSettings;

/// Two weeks, the usual lifetime of an anonymous visitor session.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 1_209_600;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cart_session_id: String,
    pub session_cookie_name: String,
    pub session_ttl_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let cart_session_id = env::var("CART_SESSION_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "cart".to_string());
        let session_cookie_name = env::var("SESSION_COOKIE_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "sessionid".to_string());
        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|ttl| *ttl > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        Ok(Self {
            port,
            database_url,
            host,
            cart_session_id,
            session_cookie_name,
            session_ttl_secs,
        })
    }

    pub fn cart_settings(&self) -> CartSettings {
        CartSettings {
            session_key: self.cart_session_id.clone(),
            ..CartSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_settings_use_configured_session_key() {
        let config = AppConfig {
            database_url: "postgres://localhost/shop".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            cart_session_id: "basket".into(),
            session_cookie_name: "sessionid".into(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        };
        let settings = config.cart_settings();
        assert_eq!(settings.session_key, "basket");
        assert_eq!(settings.coupon_key, "coupon_id");
    }
}
