use crate::ipc::error::{err, ok, session_err};
use crate::ipc::types::{AppState, Request};
use crate::session::{ClickTarget, Overlay};
use crate::view;
use serde_json::json;

fn overlay_param(req: &Request) -> Result<Overlay, serde_json::Value> {
    req.params
        .get("overlay")
        .and_then(|v| v.as_str())
        .and_then(Overlay::parse)
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                "overlay must be one of: instructions, breakdown",
                None,
            )
        })
}

fn overlay_content(state: &AppState, overlay: Overlay) -> serde_json::Value {
    let content = match overlay {
        Overlay::Instructions => serde_json::to_value(view::render_instructions(state.session.subjects())),
        Overlay::Breakdown => serde_json::to_value(view::render_breakdown(state.session.result())),
    };
    content.unwrap_or(serde_json::Value::Null)
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let overlay = match overlay_param(req) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    if let Err(e) = state.session.open_overlay(overlay) {
        return session_err(&req.id, &e);
    }
    ok(
        &req.id,
        json!({
            "overlay": overlay.as_str(),
            "stage": state.session.stage(),
            "content": overlay_content(state, overlay),
        }),
    )
}

fn handle_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let overlay = match overlay_param(req) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let closed = state.session.close_overlay(overlay);
    ok(
        &req.id,
        json!({ "closed": closed, "stage": state.session.stage() }),
    )
}

fn handle_click(state: &mut AppState, req: &Request) -> serde_json::Value {
    let overlay = match overlay_param(req) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let Some(target) = req
        .params
        .get("target")
        .and_then(|v| v.as_str())
        .and_then(ClickTarget::parse)
    else {
        return err(
            &req.id,
            "bad_params",
            "target must be one of: backdrop, content",
            None,
        );
    };
    let closed = state.session.click_overlay(overlay, target);
    ok(
        &req.id,
        json!({
            "closed": closed,
            "overlay": state.session.overlay().map(|o| o.as_str()),
            "stage": state.session.stage(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "overlay.open" => Some(handle_open(state, req)),
        "overlay.close" => Some(handle_close(state, req)),
        "overlay.click" => Some(handle_click(state, req)),
        _ => None,
    }
}
