//! Storage models and schema helpers for quiz-mcp.
//!
//! This crate defines the canonical data model shared by the data access layer,
//! the quiz service, and the MCP tool surface.

pub mod models;
pub mod schema;

pub use models::*;
