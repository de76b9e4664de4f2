use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::models::DocumentKind;
use crate::state::AppState;
use crate::views::MISSING_CREDENTIALS_WARNING;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobsuit-api"
    }))
}

/// GET /api/v1/config
/// Credential status and upload constraints for the browser. Never echoes the key.
pub async fn config_handler(State(state): State<AppState>) -> Json<Value> {
    let configured = state.controller.is_configured();
    let warnings: Vec<&str> = if configured {
        Vec::new()
    } else {
        vec![MISSING_CREDENTIALS_WARNING]
    };
    let accepted: Vec<&str> = DocumentKind::ALL.iter().map(|k| k.mime_type()).collect();

    Json(json!({
        "credentials_configured": configured,
        "warnings": warnings,
        "accepted_mime_types": accepted,
        "max_upload_bytes": state.config.max_upload_bytes,
        "models": {
            "parse": state.config.parse_model,
            "analysis": state.config.analysis_model,
            "rewrite": state.config.rewrite_model,
        }
    }))
}
