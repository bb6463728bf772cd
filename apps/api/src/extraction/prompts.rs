use crate::llm_client::prompts::BuiltinPrompt;

/// Name under which the strict output schema is sent to the provider.
pub const SCHEMA_NAME: &str = "job_parser";

/// System instruction for vacancy classification and field extraction.
pub const VACANCY_PARSER: BuiltinPrompt = (
    "vacancy_parser",
    1,
    include_str!("../../prompts/vacancy_parser.v1.txt"),
);
