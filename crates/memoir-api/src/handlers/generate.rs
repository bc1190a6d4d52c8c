//! Unauthenticated one-shot generation endpoint.
//!
//! Body `{data, style}` where `data` is a record in its JSON form. Responds
//! `{story}`; a missing field or unknown style is 400 and any generation
//! failure is a generic 500. Details are logged, never returned.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::{error, warn};

use memoir_core::{AutobiographyRecord, WritingStyle};

use crate::AppState;

const MISSING_FIELDS: &str = "Missing required fields";
const GENERATION_FAILED: &str = "Failed to generate story";

pub async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    let (record, style) = match parse_request(&body) {
        Some(parsed) => parsed,
        None => return failure(StatusCode::BAD_REQUEST, MISSING_FIELDS),
    };

    match state.lifecycle.generate(&record, style).await {
        Ok(generated) => Json(serde_json::json!({
            "story": generated.generated_story.unwrap_or_default(),
        }))
        .into_response(),
        Err(e) => {
            error!(
                subsystem = "api",
                component = "generate",
                style = %style,
                error = %e,
                "Story generation request failed"
            );
            failure(StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED)
        }
    }
}

fn parse_request(body: &[u8]) -> Option<(AutobiographyRecord, WritingStyle)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let data = value.get("data").filter(|d| is_present(d))?;
    let style = value
        .get("style")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<WritingStyle>().ok())?;

    match serde_json::from_value::<AutobiographyRecord>(data.clone()) {
        Ok(record) => Some((record, style)),
        Err(e) => {
            warn!(subsystem = "api", component = "generate", error = %e, "Unreadable biography data");
            None
        }
    }
}

/// `null`, `false`, `0` and `""` count as missing.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_accepts_record_and_style() {
        let body = br#"{"data": {"personalInfo": {"name": "Ada"}}, "style": "poetic"}"#;
        let (record, style) = parse_request(body).unwrap();
        assert_eq!(record.personal_info.name, "Ada");
        assert_eq!(style, WritingStyle::Poetic);
    }

    #[test]
    fn test_parse_request_rejects_missing_or_bad_fields() {
        for body in [
            &br#"{"style": "poetic"}"#[..],
            br#"{"data": {}}"#,
            br#"{"data": null, "style": "simple"}"#,
            br#"{"data": "", "style": "simple"}"#,
            br#"{"data": {}, "style": "gothic"}"#,
            br#"{"data": 5, "style": "simple"}"#,
            b"not json",
        ] {
            assert!(parse_request(body).is_none(), "{}", String::from_utf8_lossy(body));
        }
    }
}
