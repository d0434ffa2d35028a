use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set, sea_query::OnConflict};
use serde_json::{Map, Value};

use crate::{
    db::OrmConn,
    entity::sessions::{ActiveModel, Column, Entity as Sessions},
    error::AppResult,
    session::{Session, SessionStore},
};

/// Sessions persisted in the `sessions` table as JSON text with an expiry.
#[derive(Debug, Clone)]
pub struct DbSessionStore {
    orm: OrmConn,
    ttl: Duration,
}

impl DbSessionStore {
    pub fn new(orm: OrmConn, ttl_secs: i64) -> Self {
        Self {
            orm,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Deletes every expired row, returning how many went.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let result = Sessions::delete_many()
            .filter(Column::ExpireDate.lt(Utc::now()))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected)
    }
}

impl SessionStore for DbSessionStore {
    async fn load(&self, key: Option<&str>) -> AppResult<Session> {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return Ok(Session::new());
        };

        let row = Sessions::find_by_id(key.to_string())
            .filter(Column::ExpireDate.gt(Utc::now()))
            .one(&self.orm)
            .await?;
        let Some(row) = row else {
            return Ok(Session::new());
        };

        match serde_json::from_str::<Map<String, Value>>(&row.session_data) {
            Ok(data) => Ok(Session::from_stored(row.session_key, data)),
            Err(err) => {
                tracing::warn!(error = %err, "discarding undecodable session");
                Ok(Session::new())
            }
        }
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        let active = ActiveModel {
            session_key: Set(session.key().to_string()),
            session_data: Set(serde_json::to_string(session.data())?),
            expire_date: Set((Utc::now() + self.ttl).into()),
        };
        Sessions::insert(active)
            .on_conflict(
                OnConflict::column(Column::SessionKey)
                    .update_columns([Column::SessionData, Column::ExpireDate])
                    .to_owned(),
            )
            .exec_without_returning(&self.orm)
            .await?;
        tracing::debug!(is_new = session.is_new(), "session saved");
        Ok(())
    }
}
