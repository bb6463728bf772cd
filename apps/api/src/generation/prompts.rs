use crate::llm_client::prompts::BuiltinPrompt;

/// System instruction for the cold outreach message.
pub const OFFER_MESSAGE: BuiltinPrompt = (
    "offer_message",
    1,
    include_str!("../../prompts/offer_message.v1.txt"),
);

/// Closing link every message must carry.
pub const PORTFOLIO_LINK: &str = "https://vvbeliaev.cogisoft.dev";
