//! Provider-agnostic description of the JSON shape we ask the model for.
//!
//! Owned by this crate. Each model client translates it into its provider's
//! vocabulary at the boundary (see [`OutputSchema::to_gemini`]).

use serde_json::{json, Map, Value};

/// Only the node kinds the shift output uses. Extend alongside
/// [`OutputSchema::to_gemini`] when a new shape needs them.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSchema {
    String,
    Array(Box<OutputSchema>),
    Object(Vec<SchemaField>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: OutputSchema,
    pub required: bool,
}

impl SchemaField {
    pub fn required_string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            schema: OutputSchema::String,
            required: true,
        }
    }
}

impl OutputSchema {
    pub fn array_of(item: OutputSchema) -> Self {
        OutputSchema::Array(Box::new(item))
    }

    /// Gemini `responseSchema` (OpenAPI subset with upper-case type names).
    pub fn to_gemini(&self) -> Value {
        match self {
            OutputSchema::String => json!({ "type": "STRING" }),
            OutputSchema::Array(item) => json!({
                "type": "ARRAY",
                "items": item.to_gemini(),
            }),
            OutputSchema::Object(fields) => {
                let mut properties = Map::new();
                for field in fields {
                    let mut prop = field.schema.to_gemini();
                    if let Value::Object(obj) = &mut prop {
                        obj.insert("description".into(), json!(field.description));
                    }
                    properties.insert(field.name.to_string(), prop);
                }
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name)
                    .collect();
                json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required,
                    "propertyOrdering": fields.iter().map(|f| f.name).collect::<Vec<_>>(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_of_objects_translates_to_gemini_shape() {
        let schema = OutputSchema::array_of(OutputSchema::Object(vec![
            SchemaField::required_string("date", "the day"),
            SchemaField {
                name: "note",
                description: "free-form remark",
                schema: OutputSchema::String,
                required: false,
            },
        ]));

        let gemini = schema.to_gemini();
        assert_eq!(gemini["type"], "ARRAY");
        assert_eq!(gemini["items"]["type"], "OBJECT");
        assert_eq!(gemini["items"]["properties"]["date"]["type"], "STRING");
        assert_eq!(
            gemini["items"]["properties"]["date"]["description"],
            "the day"
        );
        assert_eq!(gemini["items"]["properties"]["note"]["type"], "STRING");
        assert_eq!(gemini["items"]["required"], json!(["date"]));
        assert_eq!(gemini["items"]["propertyOrdering"], json!(["date", "note"]));
    }

    #[test]
    fn test_string_and_nested_array() {
        assert_eq!(OutputSchema::String.to_gemini(), json!({"type": "STRING"}));
        assert_eq!(
            OutputSchema::array_of(OutputSchema::array_of(OutputSchema::String)).to_gemini(),
            json!({"type": "ARRAY", "items": {"type": "ARRAY", "items": {"type": "STRING"}}})
        );
    }
}
