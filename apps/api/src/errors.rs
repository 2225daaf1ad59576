use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Environment;

/// Message returned for non-operational and unrecognized failures.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type.
///
/// A closed set of failure kinds. Each variant knows its HTTP status, whether it
/// is operational (safe to describe to the client) and the diagnostic context
/// attached at the point of failure. Handlers hand it to [`ErrorResponder`]
/// exactly once.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        context: Option<Value>,
    },

    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: String },

    #[error("{message}")]
    Configuration {
        message: String,
        context: Option<Value>,
    },

    #[error("{message}")]
    AiService {
        message: String,
        context: Option<Value>,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>, context: Value) -> Self {
        AppError::Validation {
            message: message.into(),
            context: Some(context),
        }
    }

    pub fn configuration(message: impl Into<String>, context: Value) -> Self {
        AppError::Configuration {
            message: message.into(),
            context: Some(context),
        }
    }

    pub fn ai_service(message: impl Into<String>, context: Value) -> Self {
        AppError::AiService {
            message: message.into(),
            context: Some(context),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "ValidationError",
            AppError::MethodNotAllowed { .. } => "MethodNotAllowedError",
            AppError::Configuration { .. } => "ConfigurationError",
            AppError::AiService { .. } => "AIServiceError",
            AppError::Internal(_) => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Configuration { .. }
            | AppError::AiService { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Operational errors are anticipated failures whose message can be shown
    /// to the client. A broken deployment or an unknown fault is not.
    pub fn is_operational(&self) -> bool {
        !matches!(
            self,
            AppError::Configuration { .. } | AppError::Internal(_)
        )
    }

    pub fn context(&self) -> Option<Value> {
        match self {
            AppError::Validation { context, .. }
            | AppError::Configuration { context, .. }
            | AppError::AiService { context, .. } => context.clone(),
            AppError::MethodNotAllowed { method } => Some(json!({
                "method": method,
                "allowed": ["POST"],
            })),
            AppError::Internal(_) => None,
        }
    }

    fn client_message(&self) -> String {
        if self.is_operational() {
            self.to_string()
        } else {
            GENERIC_ERROR_MESSAGE.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Turns an [`AppError`] into the single JSON response that ends the request.
#[derive(Debug, Clone, Copy)]
pub struct ErrorResponder {
    environment: Environment,
}

impl ErrorResponder {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn respond(&self, err: AppError) -> Response {
        log_error(&err);

        let status = err.status_code();
        let mut response = (status, Json(self.body(&err))).into_response();

        if matches!(err, AppError::MethodNotAllowed { .. }) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }

        response
    }

    /// Client-facing body. Context is only exposed outside production.
    pub fn body(&self, err: &AppError) -> ErrorBody {
        let context = if self.environment.is_production() {
            None
        } else {
            err.context()
        };

        ErrorBody {
            error: err.client_message(),
            status_code: err.status_code().as_u16(),
            context,
        }
    }
}

/// Writes the full error record to the operational log. Non-operational
/// errors are marked critical.
pub fn log_error(err: &AppError) {
    let context = err
        .context()
        .map(|c| c.to_string())
        .unwrap_or_default();
    let status = err.status_code().as_u16();

    if err.is_operational() {
        tracing::error!(
            severity = "ERROR",
            kind = err.kind(),
            status,
            context = %context,
            details = ?err,
            "{err}"
        );
    } else {
        tracing::error!(
            severity = "CRITICAL",
            kind = err.kind(),
            status,
            context = %context,
            details = ?err,
            "{err}"
        );
    }
}
