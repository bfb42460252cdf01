use quiz_store::models::{Question, Quiz};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::QuizError;

/// Uniform response shape: `{"success": bool, "error"?: string, ...payload}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Option<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub const fn ok(payload: T) -> Self {
        Self {
            success: true,
            error: None,
            payload: Some(payload),
        }
    }

    #[must_use]
    pub fn failure(err: &QuizError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            payload: None,
        }
    }

    #[must_use]
    pub fn from_result(result: Result<T, QuizError>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(err) => Self::failure(&err),
        }
    }
}

/// Result of `create_quiz`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedQuiz {
    pub quiz_id: Uuid,
    pub questions_created: usize,
}

/// Result of `get_quiz`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizDetails {
    pub quiz_id: Uuid,
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

/// Result of `delete_quiz`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedQuiz {
    pub message: String,
}
