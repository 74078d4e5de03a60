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
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("campusd-router-smoke");
    let bundle_out = workspace.join("smoke-backup.campusbackup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(&mut stdin, &mut reader, "1", "health", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "auth.login",
        json!({ "id": "rishil", "password": "admin@123" }),
    );
    let _ = request(&mut stdin, &mut reader, "4", "auth.session", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "5",
        "users.create",
        json!({
            "user": {
                "id": "smoke-student",
                "name": "Smoke Student",
                "role": "student",
                "password": "pw",
                "branch": "CSE"
            }
        }),
    );
    let _ = request(&mut stdin, &mut reader, "6", "users.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "7",
        "users.updateProfile",
        json!({ "userId": "smoke-student", "patch": { "program": "B.Tech" } }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "marks.semesterAdd",
        json!({
            "studentId": "smoke-student",
            "record": {
                "semester": 1,
                "subjects": [],
                "labs": [{ "name": "Physics Lab", "marks": 92, "credits": 2 }]
            }
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "9",
        "marks.list",
        json!({ "studentId": "smoke-student" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "10",
        "marks.cgpa",
        json!({ "studentId": "smoke-student" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "11",
        "auth.login",
        json!({ "id": "smoke-student", "password": "pw" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "projects.create",
        json!({
            "title": "Smoke Project",
            "description": "smoke",
            "startDate": "2024-01-01",
            "endDate": "2024-06-01"
        }),
    );
    let _ = request(&mut stdin, &mut reader, "13", "projects.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "14",
        "internships.create",
        json!({
            "company": "Acme",
            "role": "Intern",
            "description": "smoke",
            "startDate": "2024-05-01",
            "endDate": "2024-07-01"
        }),
    );
    let _ = request(&mut stdin, &mut reader, "15", "internships.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "16",
        "certificates.upload",
        json!({
            "name": "Rust Basics",
            "issuingAuthority": "Coursera",
            "issueDate": "2024-03-15",
            "fileName": "rust-basics.pdf"
        }),
    );
    let _ = request(&mut stdin, &mut reader, "17", "certificates.list", json!({}));
    let _ = request(&mut stdin, &mut reader, "18", "auth.logout", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "19",
        "backup.exportBundle",
        json!({
            "workspacePath": workspace.to_string_lossy(),
            "outPath": bundle_out.to_string_lossy()
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "20",
        "backup.importBundle",
        json!({
            "workspacePath": workspace.to_string_lossy(),
            "inPath": bundle_out.to_string_lossy()
        }),
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
