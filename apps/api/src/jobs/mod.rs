// Schema Store boundary: persistence of job postings.

pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod store;

pub use store::{JobFilter, JobStore, StoreError};
