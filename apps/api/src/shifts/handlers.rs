//! Axum route handler for the shift parsing endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::errors::AppError;
use crate::shifts::models::ParsedShift;
use crate::shifts::validation::{validate_method, validate_parse_request};
use crate::state::AppState;

/// POST /api/parse-shifts
///
/// Mounted for every method so that anything other than POST gets the JSON
/// 405 body instead of the router's bare one. Body read failures (oversized,
/// aborted) are taken as a value so they also go through the JSON envelope.
pub async fn handle_parse_shifts(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match parse_shifts_request(&state, &method, content_type, body).await {
        Ok(shifts) => Json(shifts).into_response(),
        Err(err) => state.responder.respond(err),
    }
}

async fn parse_shifts_request(
    state: &AppState,
    method: &Method,
    content_type: Option<&str>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Vec<ParsedShift>, AppError> {
    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            validate_method(method)?;
            return Err(AppError::validation(
                "Request body could not be read",
                json!({
                    "contentType": content_type,
                    "reason": rejection.body_text(),
                    "status": rejection.status().as_u16(),
                }),
            ));
        }
    };

    let request = validate_parse_request(method, content_type, &body)?;
    state.parser.parse_shifts(&request.text).await
}
