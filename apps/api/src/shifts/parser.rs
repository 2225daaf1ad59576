//! Shift Parser — turns free text into structured shifts via the model client.
//!
//! The model is asked for JSON matching [`shift_output_schema`], but its
//! answer is re-checked here regardless: non-empty, valid JSON, an array, and
//! every element an object with string `date`, `startTime` and `endTime`.
//! The first violation fails the whole call; there are no partial results.

use std::sync::Arc;

use chrono::{Datelike, Local};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::ModelClient;
use crate::shifts::models::{shift_output_schema, ParsedShift, SHIFT_FIELDS};
use crate::shifts::prompts::{build_shift_prompt, SHIFT_PARSE_SYSTEM};
use crate::shifts::validation::json_type_name;

/// Longest slice of a bad model response that is ever put into diagnostics.
pub const RESPONSE_PREVIEW_CHARS: usize = 200;

#[derive(Clone)]
pub struct ShiftParser {
    model: Arc<dyn ModelClient>,
}

impl ShiftParser {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Parses shifts, assuming the current local year for dates without one.
    pub async fn parse_shifts(&self, text: &str) -> Result<Vec<ParsedShift>, AppError> {
        self.parse_shifts_for_year(text, Local::now().year()).await
    }

    pub async fn parse_shifts_for_year(
        &self,
        text: &str,
        year: i32,
    ) -> Result<Vec<ParsedShift>, AppError> {
        let model = self.model.model_name();

        if text.trim().is_empty() {
            return Err(AppError::ai_service(
                "Cannot parse shifts from empty text",
                json!({ "model": model }),
            ));
        }

        let prompt = build_shift_prompt(text, year);
        let raw = self
            .model
            .generate_json(SHIFT_PARSE_SYSTEM, &prompt, &shift_output_schema())
            .await
            .map_err(|e| {
                AppError::ai_service(
                    "Failed to get a response from the AI service",
                    json!({ "model": model, "originalError": e.to_string() }),
                )
            })?;

        let shifts = shifts_from_response(&raw, model)?;
        info!(model, shifts = shifts.len(), "Parsed shifts");
        Ok(shifts)
    }
}

/// Checks a raw model response and converts it into shifts, in model order.
pub fn shifts_from_response(raw: &str, model: &str) -> Result<Vec<ParsedShift>, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::ai_service(
            "AI service returned an empty response",
            json!({ "model": model }),
        ));
    }

    let value: Value = serde_json::from_str(raw).map_err(|e| {
        AppError::ai_service(
            "AI service returned invalid JSON",
            json!({
                "model": model,
                "responsePreview": preview(raw),
                "parseError": e.to_string(),
            }),
        )
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(AppError::ai_service(
                "AI service response is not an array",
                json!({ "model": model, "receivedType": json_type_name(&other) }),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| shift_from_value(index, item, model))
        .collect()
}

fn shift_from_value(index: usize, item: &Value, model: &str) -> Result<ParsedShift, AppError> {
    let Value::Object(fields) = item else {
        return Err(AppError::ai_service(
            format!("Shift at index {index} is not an object"),
            json!({
                "model": model,
                "index": index,
                "receivedType": json_type_name(item),
            }),
        ));
    };

    let string_field = |name: &str| -> Result<String, AppError> {
        match fields.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(AppError::ai_service(
                format!("Shift at index {index} has a non-string '{name}' field"),
                json!({
                    "model": model,
                    "index": index,
                    "field": name,
                    "receivedType": json_type_name(other),
                }),
            )),
            None => Err(AppError::ai_service(
                format!("Shift at index {index} is missing required field '{name}'"),
                json!({ "model": model, "index": index, "field": name }),
            )),
        }
    };

    Ok(ParsedShift {
        date: string_field(SHIFT_FIELDS[0])?,
        start_time: string_field(SHIFT_FIELDS[1])?,
        end_time: string_field(SHIFT_FIELDS[2])?,
    })
}

fn preview(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(RESPONSE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
