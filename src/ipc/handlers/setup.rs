use std::time::Duration;

use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::{SessionConfig, DEFAULT_FALLBACK_NAME, DEFAULT_REVEAL_DELAY};
use serde_json::{json, Map, Value};

#[derive(Clone, Copy)]
enum SetupSection {
    Session,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "session" => Some(Self::Session),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Session => "setup.session",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Session => json!({
            "revealDelayMs": DEFAULT_REVEAL_DELAY.as_millis() as u64,
            "fallbackName": DEFAULT_FALLBACK_NAME,
        }),
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.chars().count() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Session => match k.as_str() {
                "revealDelayMs" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 0, 10_000)?));
                }
                "fallbackName" => {
                    let s = parse_string_max(v, k, 40)?;
                    if s.is_empty() {
                        return Err(format!("{} must not be empty", k));
                    }
                    obj.insert(k.clone(), Value::String(s));
                }
                _ => return Err(format!("unknown session field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &rusqlite::Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    match db::settings_get_json(conn, section.key()) {
        Ok(Some(saved)) => {
            if let Some(saved_obj) = saved.as_object() {
                // Best-effort apply: a bad saved field leaves the defaults in place.
                if let Err(msg) = merge_section_patch(section, &mut current, saved_obj) {
                    tracing::warn!(key = section.key(), %msg, "ignoring saved setup");
                    current = default_section(section);
                }
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(key = section.key(), error = %e, "ignoring unreadable setup"),
    }
    Ok(current)
}

fn session_config_from(section: &Value) -> SessionConfig {
    let defaults = SessionConfig::default();
    SessionConfig {
        reveal_delay: section
            .get("revealDelayMs")
            .and_then(|v| v.as_u64())
            .map(Duration::from_millis)
            .unwrap_or(defaults.reveal_delay),
        fallback_name: section
            .get("fallbackName")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(defaults.fallback_name),
    }
}

pub fn load_session_config(conn: &rusqlite::Connection) -> anyhow::Result<SessionConfig> {
    Ok(session_config_from(&load_section(conn, SetupSection::Session)?))
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match state.db.as_ref() {
        Some(conn) => match load_section(conn, SetupSection::Session) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
        None => default_section(SetupSection::Session),
    };
    ok(&req.id, json!({ "session": session }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    match section {
        SetupSection::Session => state.session.set_config(session_config_from(&current)),
    }
    tracing::info!(section = section_raw, "setup updated");
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_db, temp_workspace};

    #[test]
    fn defaults_without_saved_values() {
        let conn = open_db(&temp_workspace("sgpad-setup-defaults")).expect("open db");
        let cfg = load_session_config(&conn).expect("load");
        assert_eq!(cfg.reveal_delay, DEFAULT_REVEAL_DELAY);
        assert_eq!(cfg.fallback_name, "User");
    }

    #[test]
    fn patch_is_validated_per_field() {
        let mut current = default_section(SetupSection::Session);
        let bad = json!({ "revealDelayMs": 20_000 });
        assert!(merge_section_patch(
            SetupSection::Session,
            &mut current,
            bad.as_object().expect("object")
        )
        .is_err());
        let blank = json!({ "fallbackName": "  " });
        assert!(merge_section_patch(
            SetupSection::Session,
            &mut current,
            blank.as_object().expect("object")
        )
        .is_err());
        let good = json!({ "revealDelayMs": 0, "fallbackName": "Student" });
        merge_section_patch(
            SetupSection::Session,
            &mut current,
            good.as_object().expect("object"),
        )
        .expect("valid patch");
        let cfg = session_config_from(&current);
        assert_eq!(cfg.reveal_delay, Duration::ZERO);
        assert_eq!(cfg.fallback_name, "Student");
    }

    #[test]
    fn malformed_saved_setup_falls_back_to_defaults() {
        let conn = open_db(&temp_workspace("sgpad-setup-bad")).expect("open db");
        db::settings_set_json(&conn, "setup.session", &json!({ "revealDelayMs": "soon" }))
            .expect("set");
        let cfg = load_session_config(&conn).expect("load");
        assert_eq!(cfg.reveal_delay, DEFAULT_REVEAL_DELAY);
    }
}
