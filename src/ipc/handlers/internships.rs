use crate::ipc::error::ok;
use crate::ipc::helpers::{require_role, required_date, required_str, store_mut, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Internship, Role};
use crate::visibility::{scope_for, visible_owned};
use serde_json::json;
use uuid::Uuid;

fn handle_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let scope = scope_for(store.session());
    let visible = visible_owned(&scope, store.internships(), store.users());
    Ok(json!({ "internships": visible }))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let owner = require_role(store, &[Role::Student])?;

    let internship = Internship {
        id: Uuid::new_v4().to_string(),
        company: required_str(&req.params, "company")?,
        role: required_str(&req.params, "role")?,
        description: required_str(&req.params, "description")?,
        start_date: required_date(&req.params, "startDate")?,
        end_date: required_date(&req.params, "endDate")?,
        student_id: owner.id,
    };
    let id = internship.id.clone();
    store.add_internship(internship)?;
    Ok(json!({ "internshipId": id }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let acting = require_role(store, &[Role::Student])?;
    let internship_id = required_str(&req.params, "internshipId")?;
    store.delete_internship(&internship_id, &acting.id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "internships.list" => handle_list(state, req),
        "internships.create" => handle_create(state, req),
        "internships.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
