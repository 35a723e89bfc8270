use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::theme;
use serde_json::json;

fn handle_theme_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "theme": state.theme.as_str(),
            "persisted": state.db.is_some(),
        }),
    )
}

fn handle_theme_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let next = state.theme.toggled();
    if let Some(conn) = state.db.as_ref() {
        if let Err(e) = theme::save(conn, next) {
            return err(&req.id, "db_update_failed", e.to_string(), None);
        }
    }
    state.theme = next;
    tracing::debug!(theme = next.as_str(), "theme toggled");
    ok(
        &req.id,
        json!({
            "theme": next.as_str(),
            "persisted": state.db.is_some(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "theme.get" => Some(handle_theme_get(state, req)),
        "theme.toggle" => Some(handle_theme_toggle(state, req)),
        _ => None,
    }
}
