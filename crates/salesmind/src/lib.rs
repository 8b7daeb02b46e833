//! SalesMind - Company Research and Sales Guidance Service
//!
//! Assembles research briefs from web search, turns them into sales insights
//! with a chat-completion model, and voices the result through text-to-speech.

pub mod config;
pub mod server;
