//! HTTP handlers, one module per resource

pub mod history;
pub mod insights;
pub mod keys;
pub mod research;
pub mod speech;
pub mod status;
