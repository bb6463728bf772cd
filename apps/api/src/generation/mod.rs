// Offer generation: free-form outreach text from a CV and a job description.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod language;
pub mod offer;
pub mod prompts;
