use crate::catalog::SUBJECTS;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup;
use crate::ipc::types::{AppState, Request};
use crate::theme;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "sessionId": state.session.id().to_string(),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            state.theme = theme::load(&conn);
            match setup::load_session_config(&conn) {
                Ok(cfg) => state.session.set_config(cfg),
                // Setup problems must not prevent the workspace from opening.
                Err(e) => tracing::warn!(error = %e, "session setup not applied"),
            }
            tracing::info!(workspace = %path.to_string_lossy(), theme = state.theme.as_str(), "workspace opened");
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "theme": state.theme.as_str(),
                }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_catalog_list(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let subjects: Vec<serde_json::Value> = SUBJECTS
        .iter()
        .map(|s| {
            json!({
                "key": s.key,
                "name": s.name,
                "cieMax": s.cie_max,
                "semMax": s.sem_max,
                "credit": s.credit,
                "cieHint": s.cie_hint(),
                "semHint": s.sem_hint(),
            })
        })
        .collect();
    ok(&req.id, json!({ "subjects": subjects }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "catalog.list" => Some(handle_catalog_list(state, req)),
        _ => None,
    }
}
