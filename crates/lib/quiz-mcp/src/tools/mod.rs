//! MCP tool modules.

pub mod quiz;
