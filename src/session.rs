//! Per-visitor session record and the storage seam it is loaded through.
//!
//! A [`Session`] is an ordered JSON object plus a `modified` flag. Handlers
//! mutate it freely; the HTTP layer writes it back through a [`SessionStore`]
//! only when something flagged it as modified.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    key: String,
    data: Map<String, Value>,
    modified: bool,
    is_new: bool,
}

impl Session {
    /// A fresh, empty session under a newly generated key.
    pub fn new() -> Self {
        Self {
            key: generate_session_key(),
            data: Map::new(),
            modified: false,
            is_new: true,
        }
    }

    /// A session rehydrated from storage. Starts out unmodified.
    pub fn from_stored(key: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            data,
            modified: false,
            is_new: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Typed read of a stored value. A value that does not deserialize into
    /// `T` is an error, not an absent value.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.data.get(key) {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
        self.modified = true;
    }

    /// Removes `key`, marking the session modified only if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.shift_remove(key);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Backing storage for visitor sessions.
pub trait SessionStore {
    /// Loads the session for `key`. A missing, unknown or expired key yields a
    /// fresh session with a new key.
    async fn load(&self, key: Option<&str>) -> AppResult<Session>;

    /// Writes the session and pushes its expiry forward.
    async fn save(&self, session: &Session) -> AppResult<()>;
}

fn generate_session_key() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_session_is_new_and_clean() {
        let session = Session::new();
        assert!(session.is_new());
        assert!(!session.is_modified());
        assert_eq!(session.key().len(), 32);
        assert_ne!(session.key(), Session::new().key());
    }

    #[test]
    fn insert_marks_modified() {
        let mut session = Session::from_stored("abc", Map::new());
        session.insert("coupon_id", json!("x"));
        assert!(session.is_modified());
        assert!(session.contains_key("coupon_id"));
    }

    #[test]
    fn removing_absent_key_keeps_session_clean() {
        let mut session = Session::from_stored("abc", Map::new());
        assert_eq!(session.remove("cart"), None);
        assert!(!session.is_modified());
    }

    #[test]
    fn removing_present_key_marks_modified() {
        let mut data = Map::new();
        data.insert("cart".into(), json!({}));
        let mut session = Session::from_stored("abc", data);
        assert_eq!(session.remove("cart"), Some(json!({})));
        assert!(session.is_modified());
    }

    #[test]
    fn get_as_rejects_mismatched_value() {
        let mut data = Map::new();
        data.insert("coupon_id".into(), json!("not-a-uuid"));
        let session = Session::from_stored("abc", data);
        assert!(session.get_as::<Uuid>("coupon_id").is_err());
        assert!(session.get_as::<Uuid>("missing").unwrap().is_none());
    }
}
