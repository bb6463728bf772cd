pub mod dedup;
pub mod handlers;
pub mod pipeline;

pub use pipeline::{IncomingMessage, IngestError, IngestOutcome, IngestService};
