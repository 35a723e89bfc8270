use std::time::Instant;

use crate::ipc::error::{err, ok, session_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn to_value<T: serde::Serialize>(req: &Request, v: &T) -> serde_json::Value {
    match serde_json::to_value(v) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "serialize_failed", e.to_string(), None),
    }
}

fn handle_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    to_value(req, &state.session.status(Instant::now()))
}

fn handle_start(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = req
        .params
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    match state.session.start(name) {
        Ok(form) => to_value(req, &json!({ "stage": state.session.stage(), "form": form })),
        Err(e) => session_err(&req.id, &e),
    }
}

fn handle_form(state: &mut AppState, req: &Request) -> serde_json::Value {
    to_value(req, &json!({ "form": state.session.form() }))
}

fn handle_calculate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(marks) = req.params.get("marks").filter(|v| v.is_object()) else {
        return err(&req.id, "bad_params", "marks must be an object", None);
    };
    let delay_ms = state.session.config().reveal_delay.as_millis() as u64;
    // The result itself is withheld until reveal.
    let outcome = state.session.calculate(marks, Instant::now()).map(|_| ());
    match outcome {
        Ok(()) => ok(
            &req.id,
            json!({
                "stage": state.session.stage(),
                "loadingLabel": "Calculating SGPA...",
                "revealDelayMs": delay_ms,
            }),
        ),
        Err(e) => session_err(&req.id, &e),
    }
}

fn handle_reveal(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.session.reveal(Instant::now()) {
        Ok(view) => {
            let breakdown = state.session.result().map(|r| r.breakdown.clone());
            to_value(
                req,
                &json!({
                    "stage": state.session.stage(),
                    "result": view,
                    "breakdown": breakdown,
                }),
            )
        }
        Err(e) => session_err(&req.id, &e),
    }
}

fn handle_back(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.session.back() {
        Ok(form) => to_value(req, &json!({ "stage": state.session.stage(), "form": form })),
        Err(e) => session_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.status" => Some(handle_status(state, req)),
        "session.start" => Some(handle_start(state, req)),
        "session.form" => Some(handle_form(state, req)),
        "session.calculate" => Some(handle_calculate(state, req)),
        "session.reveal" => Some(handle_reveal(state, req)),
        "session.back" => Some(handle_back(state, req)),
        _ => None,
    }
}
