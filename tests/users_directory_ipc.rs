use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_campusd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn campusd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn student_count(result: &serde_json::Value) -> usize {
    result
        .get("students")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}

#[test]
fn directory_create_delete_and_protection_rules() {
    let workspace = temp_dir("campusd-users-directory");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "auth.login",
        json!({ "id": "rishil", "password": "admin@123" }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "users.create",
        json!({
            "user": {
                "id": "s1",
                "name": "First Student",
                "role": "student",
                "password": "pw1",
                "branch": "CSE"
            }
        }),
    );
    let listed = request_ok(&mut stdin, &mut reader, "4", "users.list", json!({}));
    assert_eq!(student_count(&listed), 1);

    // Duplicate id: rejected, directory unchanged.
    let dup = request(
        &mut stdin,
        &mut reader,
        "5",
        "users.create",
        json!({
            "user": {
                "id": "s1",
                "name": "Imposter",
                "role": "student",
                "password": "pw2",
                "branch": "ECE"
            }
        }),
    );
    assert_eq!(error_code(&dup), "duplicate");
    let listed = request_ok(&mut stdin, &mut reader, "6", "users.list", json!({}));
    assert_eq!(student_count(&listed), 1);
    let branch = listed["students"][0]["branch"].as_str().unwrap_or("");
    assert_eq!(branch, "CSE", "duplicate create must not touch the original");

    // The fixed super-user can never be deleted.
    let protected = request(
        &mut stdin,
        &mut reader,
        "7",
        "users.delete",
        json!({ "userId": "rishil" }),
    );
    assert_eq!(error_code(&protected), "protected");

    let missing = request(
        &mut stdin,
        &mut reader,
        "8",
        "users.delete",
        json!({ "userId": "nobody" }),
    );
    assert_eq!(error_code(&missing), "not_found");

    // Profile update mirrors into the session snapshot of the target user.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "auth.login",
        json!({ "id": "s1", "password": "pw1" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "users.updateProfile",
        json!({ "userId": "s1", "patch": { "name": "Renamed Student" } }),
    );
    let session = request_ok(&mut stdin, &mut reader, "11", "auth.session", json!({}));
    assert_eq!(
        session["user"]["name"].as_str(),
        Some("Renamed Student"),
        "session snapshot must mirror the profile update"
    );
    assert!(
        session["user"].get("password").is_none(),
        "password must never be echoed"
    );

    // Password change takes effect for the next login.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "users.updatePassword",
        json!({ "userId": "s1", "password": "fresh" }),
    );
    let stale = request(
        &mut stdin,
        &mut reader,
        "13",
        "auth.login",
        json!({ "id": "s1", "password": "pw1" }),
    );
    assert_eq!(error_code(&stale), "invalid_credentials");
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "auth.login",
        json!({ "id": "s1", "password": "fresh" }),
    );

    // Students cannot manage other accounts.
    let forbidden = request(
        &mut stdin,
        &mut reader,
        "15",
        "users.delete",
        json!({ "userId": "s1" }),
    );
    assert_eq!(error_code(&forbidden), "forbidden");

    // Admin can delete the student for real.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "auth.login",
        json!({ "id": "rishil", "password": "admin@123" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "17",
        "users.delete",
        json!({ "userId": "s1" }),
    );
    let listed = request_ok(&mut stdin, &mut reader, "18", "users.list", json!({}));
    assert_eq!(student_count(&listed), 0);

    let _ = std::fs::remove_dir_all(workspace);
}
