// Shift parsing: free-text shift descriptions in, structured shifts out.
// All model calls go through llm_client; nothing here talks to Gemini directly.

pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod validation;
