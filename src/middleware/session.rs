use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
};

use crate::{
    error::{AppError, AppResult},
    session::{Session, SessionStore},
    state::AppState,
};

/// The visitor's session, loaded from the session cookie before the handler
/// runs. Handlers hand it back through [`VisitorSession::commit`].
#[derive(Debug)]
pub struct VisitorSession(pub Session);

impl FromRequestParts<AppState> for VisitorSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = session_key_from_headers(&parts.headers, &state.session_cookie);
        let session = state.sessions.load(key.as_deref()).await?;
        Ok(VisitorSession(session))
    }
}

impl VisitorSession {
    /// Saves the session if anything marked it modified and returns the
    /// `Set-Cookie` header for the response. Unmodified sessions are not
    /// written and produce no headers.
    pub async fn commit(self, state: &AppState) -> AppResult<HeaderMap> {
        self.commit_to(
            &state.sessions,
            &state.session_cookie,
            state.sessions.ttl().num_seconds(),
        )
        .await
    }

    async fn commit_to<S: SessionStore>(
        self,
        store: &S,
        cookie_name: &str,
        max_age_secs: i64,
    ) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if !self.0.is_modified() {
            return Ok(headers);
        }

        store.save(&self.0).await?;
        let cookie = session_cookie(cookie_name, self.0.key(), max_age_secs);
        let value = HeaderValue::from_str(&cookie)
            .map_err(|err| AppError::Internal(anyhow::anyhow!("invalid session cookie: {err}")))?;
        headers.insert(header::SET_COOKIE, value);
        Ok(headers)
    }
}

fn session_key_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
}

fn session_cookie(name: &str, key: &str, max_age_secs: i64) -> String {
    format!("{name}={key}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}
