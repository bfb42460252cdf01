//! Core services for quiz-mcp.
//!
//! This crate owns the data access layer over the quiz tables and the quiz
//! service that tool handlers call into. Store failures are logged where they
//! happen and surface to callers as `QuizError` values, never as panics.

pub mod control;
pub mod store;
