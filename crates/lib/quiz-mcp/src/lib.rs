//! MCP server implementation for quiz-mcp.
//!
//! This crate wires the quiz control plane into rmcp tool handlers and exposes
//! the stdio and streamable HTTP runners.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use quiz_core::control::QuizControlPlane;
use quiz_core::store::QuizStore;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

pub use tools::quiz::{CreateQuizParams, QuizIdParams};

/// Literal returned by the `healthz` tool.
pub const HEALTHZ_STATUS: &str = "Quiz MCP!";

const SERVER_INSTRUCTIONS: &str = r#"quiz-mcp provides MCP tools for creating, reading, listing and deleting quizzes.

Workflow:
1. Call `create_quiz` with `title`, `description`, `is_public` and an ordered `questions` array.
   Each question has `question_text`, `order_index`, `question_type` and a matching `question_data`:
   - `fill_blank`: `{"text_with_blanks": "...", "blanks": ["..."]}`
   - `column_match`: `{"left_column": [...], "right_column": [...], "correct_pairs": {"0": 3}}`
   - `multiple_choice`: `{"options": [...], "correct_index": 1}`
2. Use the returned `quiz_id` with `get_quiz` or `delete_quiz`.
3. `list_quizzes` returns every stored quiz header.

Notes:
- `create_quiz`, `get_quiz` and `delete_quiz` return `{"success": bool, "error"?: string, ...}`.
  Branch on `success`.
- Deleting a quiz also deletes its questions.
- `healthz` returns a fixed status string."#;

/// MCP server wrapper around the quiz control plane and tool routers.
pub struct QuizMcp<S: QuizStore> {
    tool_router: ToolRouter<Self>,
    control: Arc<QuizControlPlane<S>>,
}

impl<S: QuizStore> Clone for QuizMcp<S> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            control: self.control.clone(),
        }
    }
}

impl<S: QuizStore> QuizMcp<S> {
    /// Creates a new server owning the control plane.
    #[must_use]
    pub fn new(control: QuizControlPlane<S>) -> Self {
        Self::with_control(Arc::new(control))
    }

    /// Creates a new server using a shared control plane handle.
    #[must_use]
    pub fn with_control(control: Arc<QuizControlPlane<S>>) -> Self {
        let tool_router = Self::tool_router_core() + Self::tool_router_quiz();
        Self {
            tool_router,
            control,
        }
    }

    pub(crate) fn control(&self) -> &QuizControlPlane<S> {
        &self.control
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<S: QuizStore> QuizMcp<S> {
    #[tool(description = "Liveness check. Returns a fixed status string.")]
    async fn healthz(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(HEALTHZ_STATUS)]))
    }
}

#[tool_handler]
impl<S: QuizStore> ServerHandler for QuizMcp<S> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
