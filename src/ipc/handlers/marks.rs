use crate::ipc::error::ok;
use crate::ipc::helpers::{require_role, required_str, session_user, store_mut, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Laboratory, Role, SemesterRecord, Subject};
use crate::store::Store;
use crate::visibility::scope_for;
use serde_json::json;

/// Marks for a student may be read or written only by actors whose scope
/// covers that student: the student themselves, a same-department teacher,
/// or an admin.
fn require_student_in_scope(store: &Store, student_id: &str) -> Result<(), HandlerErr> {
    session_user(store)?;
    let scope = scope_for(store.session());
    let dept = store
        .find_user(student_id)
        .and_then(|u| u.department_key());
    if scope.permits(student_id, dept) {
        Ok(())
    } else {
        Err(HandlerErr::new(
            "forbidden",
            "student is outside the current user's scope",
        ))
    }
}

fn handle_semester_add(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    require_role(store, &[Role::Admin, Role::Teacher])?;
    let student_id = required_str(&req.params, "studentId")?;
    require_student_in_scope(store, &student_id)?;

    let Some(raw) = req.params.get("record") else {
        return Err(HandlerErr::new("bad_params", "missing params.record"));
    };
    let record: SemesterRecord = serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::new("validation", format!("invalid record: {}", e)))?;

    let saved = store.add_semester_record(&student_id, record)?;
    Ok(json!({ "record": saved }))
}

fn handle_semester_update(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    require_role(store, &[Role::Admin, Role::Teacher])?;
    let student_id = required_str(&req.params, "studentId")?;
    require_student_in_scope(store, &student_id)?;

    let Some(semester) = req.params.get("semester").and_then(|v| v.as_i64()) else {
        return Err(HandlerErr::new("bad_params", "missing params.semester"));
    };
    let subjects: Vec<Subject> = match req.params.get("subjects") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| HandlerErr::new("validation", format!("invalid subjects: {}", e)))?,
        None => Vec::new(),
    };
    let labs: Vec<Laboratory> = match req.params.get("labs") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| HandlerErr::new("validation", format!("invalid labs: {}", e)))?,
        None => Vec::new(),
    };

    let saved = store.update_marks(&student_id, semester, subjects, labs)?;
    Ok(json!({ "record": saved }))
}

fn handle_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let student_id = required_str(&req.params, "studentId")?;
    require_student_in_scope(store, &student_id)?;
    Ok(json!({ "records": store.semester_records(&student_id) }))
}

fn handle_cgpa(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    let student_id = required_str(&req.params, "studentId")?;
    require_student_in_scope(store, &student_id)?;
    Ok(json!({ "cgpa": store.cgpa(&student_id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "marks.semesterAdd" => handle_semester_add(state, req),
        "marks.semesterUpdate" => handle_semester_update(state, req),
        "marks.list" => handle_list(state, req),
        "marks.cgpa" => handle_cgpa(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
