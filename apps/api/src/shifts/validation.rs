//! Request validation for the shift parsing endpoint.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. method is `POST`
//! 2. body is present, sent as JSON, and a JSON object
//! 3. `text` key present
//! 4. `text` is a string
//! 5. `text` is non-empty after trimming

use axum::http::Method;
use serde_json::{json, Map, Value};

use crate::errors::AppError;
use crate::shifts::models::ParseRequest;

/// Full validation of an inbound request.
pub fn validate_parse_request(
    method: &Method,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<ParseRequest, AppError> {
    validate_method(method)?;

    let body = decode_body(content_type, body)?;
    let fields = match &body {
        None | Some(Value::Null) => {
            return Err(AppError::validation(
                "Request body is required",
                json!({ "contentType": content_type }),
            ))
        }
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            return Err(AppError::validation(
                "Request body must be a JSON object",
                json!({ "receivedType": json_type_name(other) }),
            ))
        }
    };

    validate_text_field(fields)
}

/// Check 1 on its own, for requests whose body never arrived.
pub fn validate_method(method: &Method) -> Result<(), AppError> {
    if *method != Method::POST {
        return Err(AppError::MethodNotAllowed {
            method: method.to_string(),
        });
    }
    Ok(())
}

/// Only the `text` checks, for callers that already validated method and
/// body shape.
pub fn validate_text_field(body: &Map<String, Value>) -> Result<ParseRequest, AppError> {
    let Some(text) = body.get("text") else {
        let received_keys: Vec<&String> = body.keys().collect();
        return Err(AppError::validation(
            "Missing required field: text",
            json!({ "receivedKeys": received_keys }),
        ));
    };

    let Value::String(text) = text else {
        return Err(AppError::validation(
            "Field 'text' must be a string",
            json!({ "receivedType": json_type_name(text) }),
        ));
    };

    if text.trim().is_empty() {
        return Err(AppError::validation(
            "Field 'text' must not be empty",
            json!({ "length": text.chars().count() }),
        ));
    }

    Ok(ParseRequest { text: text.clone() })
}

/// Name of a JSON value's type as reported in diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(essence) = content_type.and_then(|ct| ct.split(';').next()) else {
        return false;
    };
    let essence = essence.trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Empty (or whitespace-only) bodies count as absent. Anything else must be
/// declared as JSON; other payloads are treated as raw text.
fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<Option<Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    if !is_json_content_type(content_type) {
        return Err(AppError::validation(
            "Request body must be a JSON object",
            json!({ "contentType": content_type, "receivedType": "string" }),
        ));
    }

    serde_json::from_slice(body).map(Some).map_err(|e| {
        AppError::validation(
            "Request body must be valid JSON",
            json!({ "contentType": content_type, "parseError": e.to_string() }),
        )
    })
}
