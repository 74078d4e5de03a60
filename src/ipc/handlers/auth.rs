use crate::ipc::error::ok;
use crate::ipc::helpers::{required_str, store_mut, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let id = required_str(&req.params, "id")?;
    let password = req
        .params
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let user = store.login(&id, password)?;
    Ok(json!({ "user": user.sanitized() }))
}

fn handle_logout(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    store.logout()?;
    Ok(json!({ "ok": true }))
}

fn handle_session(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let user = store.session().map(|u| u.sanitized());
    Ok(json!({ "user": user }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "auth.login" => handle_login(state, req),
        "auth.logout" => handle_logout(state, req),
        "auth.session" => handle_session(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
