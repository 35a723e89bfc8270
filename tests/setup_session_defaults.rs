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
    let exe = env!("CARGO_BIN_EXE_sgpad");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn sgpad");
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
        .pointer("/error/code")
        .and_then(|v| v.as_str())
        .unwrap_or("")
}


#[test]
fn session_setup_defaults_and_update() {
    let workspace = temp_dir("sgpad-setup");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let defaults = request_ok(&mut stdin, &mut reader, "1", "setup.get", json!({}));
    assert_eq!(
        defaults.pointer("/session/revealDelayMs").and_then(|v| v.as_i64()),
        Some(2000)
    );
    assert_eq!(
        defaults.pointer("/session/fallbackName").and_then(|v| v.as_str()),
        Some("User")
    );

    let no_ws = request(
        &mut stdin,
        &mut reader,
        "2",
        "setup.update",
        json!({ "section": "session", "patch": { "revealDelayMs": 0 } }),
    );
    assert_eq!(error_code(&no_ws), "no_workspace");

    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let bad = request(
        &mut stdin,
        &mut reader,
        "4",
        "setup.update",
        json!({ "section": "session", "patch": { "revealDelayMs": -5 } }),
    );
    assert_eq!(error_code(&bad), "bad_params");
    let unknown = request(
        &mut stdin,
        &mut reader,
        "5",
        "setup.update",
        json!({ "section": "session", "patch": { "colour": "red" } }),
    );
    assert_eq!(error_code(&unknown), "bad_params");

    request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "setup.update",
        json!({ "section": "session", "patch": { "fallbackName": "Student" } }),
    );
    let started = request_ok(&mut stdin, &mut reader, "7", "session.start", json!({ "name": "" }));
    assert_eq!(
        started.pointer("/form/displayName").and_then(|v| v.as_str()),
        Some("Student")
    );
    let saved = request_ok(&mut stdin, &mut reader, "8", "setup.get", json!({}));
    assert_eq!(
        saved.pointer("/session/fallbackName").and_then(|v| v.as_str()),
        Some("Student")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
