use crate::ipc::error::ok;
use crate::ipc::helpers::{
    optional_str, require_role, required_date, required_str, store_mut, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Certificate, Role};
use crate::visibility::scope_for;
use chrono::Local;
use serde_json::json;
use uuid::Uuid;

fn handle_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let scope = scope_for(store.session());
    // Certificates carry a denormalized owner snapshot, so the department
    // check needs no directory lookup.
    let visible: Vec<&Certificate> = store
        .certificates()
        .iter()
        .filter(|c| scope.permits(&c.user_id, c.user_data.department.as_deref()))
        .collect();
    Ok(json!({ "certificates": visible }))
}

fn handle_upload(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let AppState { store, blobs, .. } = state;
    let Some(store) = store.as_mut() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    let owner = require_role(store, &[Role::Student])?;

    let name = required_str(&req.params, "name")?;
    let issuing_authority = required_str(&req.params, "issuingAuthority")?;
    let issue_date = required_date(&req.params, "issueDate")?;
    let description = optional_str(&req.params, "description");

    let file_url = optional_str(&req.params, "fileName").map(|f| blobs.put(&owner.id, &f));

    let certificate = Certificate {
        id: Uuid::new_v4().to_string(),
        name,
        issuing_authority,
        issue_date,
        description,
        file_url,
        upload_date: Local::now().date_naive().to_string(),
        user_id: owner.id.clone(),
        user_data: owner.snapshot(),
    };
    let id = certificate.id.clone();
    let file_url = certificate.file_url.clone();
    store.add_certificate(certificate)?;
    Ok(json!({ "certificateId": id, "fileUrl": file_url }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let acting = require_role(store, &[Role::Student])?;
    let certificate_id = required_str(&req.params, "certificateId")?;
    store.delete_certificate(&certificate_id, &acting.id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "certificates.list" => handle_list(state, req),
        "certificates.upload" => handle_upload(state, req),
        "certificates.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
