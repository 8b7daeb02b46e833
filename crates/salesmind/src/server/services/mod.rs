//! Outbound provider clients, prompt construction and the document store

pub mod catalog;
pub mod completion;
pub mod insights;
pub mod prompts;
pub mod search;
pub mod speech;
pub mod store;
