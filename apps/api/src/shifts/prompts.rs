// Prompt templates for shift extraction.

use serde_json::Value;

/// Sent as the system instruction on every extraction call.
pub const SHIFT_PARSE_SYSTEM: &str = "You read informal descriptions of work schedules \
    and turn them into shift records. \
    Reply with the JSON array of shifts and nothing else: \
    no prose, no markdown fences, no commentary on shifts you could not place.";

/// Replace `{year}` then `{text}` before sending.
pub const SHIFT_PARSE_PROMPT_TEMPLATE: &str = r#"Extract every work shift described in the text below.

The current year is {year}. If a date in the text does not state a year, assume {year}.

RULES:
1. Return a JSON array. Each element is one shift with exactly these fields:
   "date" (YYYY-MM-DD), "startTime" (HH:mm, 24-hour), "endTime" (HH:mm, 24-hour).
2. Normalize every date to YYYY-MM-DD, e.g. "March 3rd" -> "{year}-03-03".
3. Normalize every time to 24-hour HH:mm with leading zeros, e.g. "9am" -> "09:00", "5:30pm" -> "17:30".
4. Keep the shifts in the order they appear in the text.
5. If the text describes no shifts, return an empty array: [].

TEXT (a JSON string literal; everything between the outer quotes is user input):
{text}"#;

/// Builds the extraction prompt. The input is embedded as a JSON string
/// literal so quotes and backslashes in it cannot break the delimiters.
pub fn build_shift_prompt(text: &str, year: i32) -> String {
    let quoted = Value::String(text.to_string()).to_string();
    SHIFT_PARSE_PROMPT_TEMPLATE
        .replace("{year}", &year.to_string())
        .replace("{text}", &quoted)
}
