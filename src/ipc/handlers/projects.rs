use crate::ipc::error::ok;
use crate::ipc::helpers::{
    optional_str, require_role, required_date, required_str, store_mut, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Project, Role};
use crate::visibility::{scope_for, visible_owned};
use serde_json::json;
use uuid::Uuid;

fn handle_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let scope = scope_for(store.session());
    let visible = visible_owned(&scope, store.projects(), store.users());
    Ok(json!({ "projects": visible }))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let owner = require_role(store, &[Role::Student])?;

    let project = Project {
        id: Uuid::new_v4().to_string(),
        title: required_str(&req.params, "title")?,
        description: required_str(&req.params, "description")?,
        technologies: optional_str(&req.params, "technologies").unwrap_or_default(),
        start_date: required_date(&req.params, "startDate")?,
        end_date: required_date(&req.params, "endDate")?,
        student_id: owner.id,
    };
    let id = project.id.clone();
    store.add_project(project)?;
    Ok(json!({ "projectId": id }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let acting = require_role(store, &[Role::Student])?;
    let project_id = required_str(&req.params, "projectId")?;
    store.delete_project(&project_id, &acting.id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "projects.list" => handle_list(state, req),
        "projects.create" => handle_create(state, req),
        "projects.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
