use chrono::NaiveDate;
use serde_json::Value;

use crate::ipc::error::err;
use crate::ipc::types::AppState;
use crate::model::{Role, User};
use crate::store::{Store, StoreError};

pub struct HandlerErr {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        HandlerErr {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, &self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        HandlerErr::new(e.code, e.message)
    }
}

pub fn required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub fn optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Dates travel as YYYY-MM-DD strings; reject anything chrono can't parse.
pub fn required_date(params: &Value, key: &str) -> Result<String, HandlerErr> {
    let raw = required_str(params, key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| HandlerErr::new("validation", format!("{} must be YYYY-MM-DD", key)))?;
    Ok(raw)
}

pub fn store_mut<'a>(state: &'a mut AppState) -> Result<&'a mut Store, HandlerErr> {
    state
        .store
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn session_user(store: &Store) -> Result<User, HandlerErr> {
    store
        .session()
        .cloned()
        .ok_or_else(|| HandlerErr::new("forbidden", "not logged in"))
}

pub fn require_role(store: &Store, roles: &[Role]) -> Result<User, HandlerErr> {
    let user = session_user(store)?;
    if roles.contains(&user.role) {
        Ok(user)
    } else {
        Err(HandlerErr::new(
            "forbidden",
            "the current role may not perform this operation",
        ))
    }
}
