use serde::{Deserialize, Serialize};

use crate::llm_client::schema::{OutputSchema, SchemaField};

/// Field names every shift must carry, in output order.
pub const SHIFT_FIELDS: [&str; 3] = ["date", "startTime", "endTime"];

/// A validated request: `text` is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest {
    pub text: String,
}

/// One extracted shift. Formats are requested from the model but not
/// enforced here; a shift is valid as long as all three fields are strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedShift {
    /// YYYY-MM-DD
    pub date: String,
    /// HH:mm, 24-hour
    pub start_time: String,
    /// HH:mm, 24-hour
    pub end_time: String,
}

/// Output constraint sent with every shift extraction call.
pub fn shift_output_schema() -> OutputSchema {
    OutputSchema::array_of(OutputSchema::Object(vec![
        SchemaField::required_string(SHIFT_FIELDS[0], "Shift date in YYYY-MM-DD format"),
        SchemaField::required_string(SHIFT_FIELDS[1], "Shift start time in 24-hour HH:mm format"),
        SchemaField::required_string(SHIFT_FIELDS[2], "Shift end time in 24-hour HH:mm format"),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parsed_shift_serializes_camel_case() {
        let shift = ParsedShift {
            date: "2026-01-12".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
        };
        assert_eq!(
            serde_json::to_value(&shift).unwrap(),
            json!({"date": "2026-01-12", "startTime": "09:00", "endTime": "17:00"})
        );
    }

    #[test]
    fn test_schema_requires_all_shift_fields() {
        let gemini = shift_output_schema().to_gemini();
        assert_eq!(gemini["type"], "ARRAY");
        assert_eq!(gemini["items"]["required"], json!(SHIFT_FIELDS));
        for field in SHIFT_FIELDS {
            assert_eq!(gemini["items"]["properties"][field]["type"], "STRING");
        }
    }
}
