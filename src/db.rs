use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "sgpa.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

/// Raw stored text, without JSON decoding.
pub fn settings_get_raw(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get::<_, String>(0),
        )
        .optional()?;
    Ok(v)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let Some(text) = settings_get_raw(conn, key)? else {
        return Ok(None);
    };
    let v = serde_json::from_str(&text)
        .with_context(|| format!("setting {} is not valid JSON", key))?;
    Ok(Some(v))
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn temp_workspace(prefix: &str) -> std::path::PathBuf {
    let p = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_roundtrip_and_overwrite() {
        let ws = temp_workspace("sgpad-db");
        let conn = open_db(&ws).expect("open db");
        assert!(settings_get_json(&conn, "theme").expect("get").is_none());

        settings_set_json(&conn, "theme", &json!("dark")).expect("set");
        settings_set_json(&conn, "theme", &json!("light")).expect("set again");
        assert_eq!(
            settings_get_json(&conn, "theme").expect("get"),
            Some(json!("light"))
        );
    }

    #[test]
    fn reopening_keeps_settings() {
        let ws = temp_workspace("sgpad-db-reopen");
        {
            let conn = open_db(&ws).expect("open db");
            settings_set_json(&conn, "setup.session", &json!({ "revealDelayMs": 0 }))
                .expect("set");
        }
        let conn = open_db(&ws).expect("reopen db");
        let v = settings_get_json(&conn, "setup.session").expect("get").expect("present");
        assert_eq!(v["revealDelayMs"], json!(0));
    }

    #[test]
    fn corrupt_json_is_an_error_not_a_panic() {
        let ws = temp_workspace("sgpad-db-corrupt");
        let conn = open_db(&ws).expect("open db");
        conn.execute(
            "INSERT INTO settings(key, value_json) VALUES('theme', 'not json')",
            [],
        )
        .expect("insert");
        assert!(settings_get_json(&conn, "theme").is_err());
        assert_eq!(
            settings_get_raw(&conn, "theme").expect("raw").as_deref(),
            Some("not json")
        );
    }
}
