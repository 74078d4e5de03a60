use crate::ipc::error::ok;
use crate::ipc::helpers::{require_role, required_str, session_user, store_mut, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Role, User};
use crate::visibility::{scope_for, visible_students};
use serde_json::json;

/// Student directory, scoped by the acting user's visibility. Each row
/// carries the computed CGPA for the records dashboard.
fn handle_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let scope = scope_for(store.session());
    let students: Vec<serde_json::Value> = visible_students(&scope, store.users())
        .into_iter()
        .map(|u| {
            let mut row = u.sanitized();
            row["cgpa"] = json!(store.cgpa(&u.id));
            row
        })
        .collect();
    Ok(json!({ "students": students }))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    require_role(store, &[Role::Admin])?;

    let Some(raw) = req.params.get("user") else {
        return Err(HandlerErr::new("bad_params", "missing params.user"));
    };
    let user: User = serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::new("validation", format!("invalid user: {}", e)))?;
    let id = user.id.clone();

    store.create_user(user)?;
    Ok(json!({ "userId": id }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    require_role(store, &[Role::Admin])?;
    let user_id = required_str(&req.params, "userId")?;
    store.delete_user(&user_id)?;
    Ok(json!({ "ok": true }))
}

fn require_admin_or_self(store: &crate::store::Store, target: &str) -> Result<(), HandlerErr> {
    let acting = session_user(store)?;
    if acting.role == Role::Admin || acting.id == target {
        Ok(())
    } else {
        Err(HandlerErr::new(
            "forbidden",
            "only the account owner or an administrator may update this account",
        ))
    }
}

fn handle_update_profile(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let user_id = required_str(&req.params, "userId")?;
    require_admin_or_self(store, &user_id)?;

    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::new("bad_params", "missing params.patch"));
    };
    let updated = store.update_profile(&user_id, patch)?;
    Ok(json!({ "user": updated.sanitized() }))
}

fn handle_update_password(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let user_id = required_str(&req.params, "userId")?;
    require_admin_or_self(store, &user_id)?;

    let password = req
        .params
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    store.update_password(&user_id, password)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "users.list" => handle_list(state, req),
        "users.create" => handle_create(state, req),
        "users.delete" => handle_delete(state, req),
        "users.updateProfile" => handle_update_profile(state, req),
        "users.updatePassword" => handle_update_password(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
