use std::borrow::Cow;

use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use serde::Serialize;

#[must_use]
pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Wraps a serializable value as a single JSON text block.
///
/// # Errors
/// Returns an internal MCP error if the value cannot be serialized.
pub fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let body = serde_json::to_string(value).map_err(|err| {
        mcp_err(
            ErrorCode::INTERNAL_ERROR,
            format!("failed to encode tool result: {err}"),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

/// Tool-level failure: the call completes but is flagged as an error.
#[must_use]
pub fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}
