use quiz_core::control::{CreateQuizRequest, Envelope};
use quiz_core::store::QuizStore;
use quiz_store::models::NewQuestion;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{QuizMcp, helpers};

/// Parameters for creating a quiz with its questions.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateQuizParams {
    pub title: String,
    pub description: String,
    pub is_public: bool,
    /// Questions in the order they should be stored.
    pub questions: Vec<NewQuestion>,
}

impl From<CreateQuizParams> for CreateQuizRequest {
    fn from(params: CreateQuizParams) -> Self {
        Self {
            title: params.title,
            description: params.description,
            is_public: params.is_public,
            questions: params.questions,
        }
    }
}

/// Parameters for tools addressing a single quiz.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QuizIdParams {
    /// Quiz id as returned by `create_quiz`.
    pub quiz_id: String,
}

#[tool_router(router = tool_router_quiz, vis = "pub")]
impl<S: QuizStore> QuizMcp<S> {
    #[tool(description = "List every stored quiz.")]
    async fn list_quizzes(&self) -> Result<CallToolResult, ErrorData> {
        match self.control().list_quizzes().await {
            Ok(quizzes) => helpers::json_result(&quizzes),
            Err(err) => {
                warn!(error = %err, "list_quizzes failed");
                Ok(helpers::tool_error(err.to_string()))
            }
        }
    }

    #[tool(description = "Create a quiz with fill_blank, column_match or multiple_choice questions.")]
    async fn create_quiz(
        &self,
        Parameters(params): Parameters<CreateQuizParams>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(title = %params.title, questions = params.questions.len(), "create_quiz");
        let result = self.control().create_quiz(params.into()).await;
        helpers::json_result(&Envelope::from_result(result))
    }

    #[tool(description = "Fetch a quiz and its questions ordered by order_index.")]
    async fn get_quiz(
        &self,
        Parameters(params): Parameters<QuizIdParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self.control().get_quiz(&params.quiz_id).await;
        helpers::json_result(&Envelope::from_result(result))
    }

    #[tool(description = "Delete a quiz and all of its questions.")]
    async fn delete_quiz(
        &self,
        Parameters(params): Parameters<QuizIdParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self.control().delete_quiz(&params.quiz_id).await;
        helpers::json_result(&Envelope::from_result(result))
    }
}
