// Vacancy extraction: schema-constrained parsing of raw channel messages.
// Provider calls go through llm_client; nothing here speaks HTTP.

pub mod analyzer;
pub mod prompts;
pub mod schema;
