//! REST API module for the salesmind service
//!
//! Provides HTTP JSON endpoints for company research, insight generation,
//! speech synthesis, credential management and search history.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routing;
pub mod services;
pub mod startup;
pub mod state;
pub mod types;
