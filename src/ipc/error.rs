use serde_json::json;

use crate::session::SessionError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn session_err(id: &str, e: &SessionError) -> serde_json::Value {
    let details = match e {
        SessionError::Validation(errors) => Some(json!({
            "errors": errors
                .iter()
                .filter_map(|v| crate::catalog::find(&v.subject_key).map(|s| v.to_json(s)))
                .collect::<Vec<_>>()
        })),
        SessionError::InvalidTransition { action, stage } => Some(json!({
            "action": action,
            "stage": stage.as_str(),
        })),
        SessionError::RevealPending { remaining_ms } => Some(json!({
            "remainingMs": remaining_ms,
        })),
        SessionError::Calc(c) => c.details.clone(),
        SessionError::OverlayOpen(_) | SessionError::OverlayUnavailable { .. } => None,
    };
    err(id, e.code(), e.to_string(), details)
}
