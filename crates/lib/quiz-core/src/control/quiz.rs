use quiz_store::models::{NewQuestion, NewQuestionRow, NewQuiz, Quiz};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{CreatedQuiz, DeletedQuiz, QuizControlPlane, QuizDetails, QuizError};
use crate::store::QuizStore;

/// Input for [`QuizControlPlane::create_quiz`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateQuizRequest {
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub questions: Vec<NewQuestion>,
}

impl<S: QuizStore> QuizControlPlane<S> {
    /// Creates a quiz header and its questions.
    ///
    /// Questions keep their input order. If the question insert fails the quiz
    /// row is deleted again so no empty quiz is left behind.
    ///
    /// # Errors
    /// Returns `QuizError::UserNotFound` when the creator cannot be resolved,
    /// `QuizError::QuizCreationFailed` when the quiz insert fails and
    /// `QuizError::QuestionInsertFailed` when the question insert fails.
    pub async fn create_quiz(&self, request: CreateQuizRequest) -> Result<CreatedQuiz, QuizError> {
        // Placeholder identity: every quiz is owned by the configured creator
        // until callers are authenticated.
        let creator = match self.store.find_user_by_email(&self.creator_email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(email = %self.creator_email, "creator profile not found");
                return Err(QuizError::UserNotFound);
            }
            Err(err) => {
                error!(email = %self.creator_email, error = %err, "creator lookup failed");
                return Err(QuizError::UserNotFound);
            }
        };

        let quiz = self
            .store
            .insert_quiz(NewQuiz {
                creator_id: creator.id,
                title: request.title,
                description: request.description,
                is_public: request.is_public,
            })
            .await
            .map_err(|_| QuizError::QuizCreationFailed)?;

        if request.questions.is_empty() {
            info!(quiz_id = %quiz.id, "created quiz without questions");
            return Ok(CreatedQuiz {
                quiz_id: quiz.id,
                questions_created: 0,
            });
        }

        let rows: Vec<NewQuestionRow> = request
            .questions
            .into_iter()
            .map(|question| NewQuestionRow::for_quiz(quiz.id, question))
            .collect();
        let expected = rows.len();

        match self.store.insert_questions(rows).await {
            Ok(stored) => {
                debug!(quiz_id = %quiz.id, expected, stored = stored.len(), "questions stored");
                info!(quiz_id = %quiz.id, questions = expected, "created quiz");
                Ok(CreatedQuiz {
                    quiz_id: quiz.id,
                    questions_created: expected,
                })
            }
            Err(_) => {
                self.discard_quiz(quiz.id).await;
                Err(QuizError::QuestionInsertFailed)
            }
        }
    }

    /// Fetches a quiz and its questions in `order_index` order.
    ///
    /// # Errors
    /// Returns `QuizError::QuizNotFound` when the id is malformed or unknown and
    /// `QuizError::NoQuestionsFound` when the question fetch fails.
    pub async fn get_quiz(&self, quiz_id: &str) -> Result<QuizDetails, QuizError> {
        let quiz = self.require_quiz(quiz_id).await?;
        let questions = self
            .store
            .find_questions_by_quiz_id(quiz.id)
            .await
            .map_err(|_| QuizError::NoQuestionsFound)?;
        Ok(QuizDetails {
            quiz_id: quiz.id,
            quiz,
            questions,
        })
    }

    /// Lists every stored quiz, oldest first.
    ///
    /// No caller scoping is applied yet; any caller sees every quiz.
    ///
    /// # Errors
    /// Returns `QuizError::Unexpected` if the store query fails.
    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>, QuizError> {
        Ok(self.store.list_quizzes().await?)
    }

    /// Deletes a quiz. Its questions are removed by the cascade rule.
    ///
    /// # Errors
    /// Returns `QuizError::QuizNotFound` when the id is malformed or unknown, or
    /// when the delete removes no row, and `QuizError::QuizDeletionFailed` when
    /// the delete fails.
    pub async fn delete_quiz(&self, quiz_id: &str) -> Result<DeletedQuiz, QuizError> {
        let quiz = self.require_quiz(quiz_id).await?;
        let removed = self
            .store
            .delete_quiz_by_id(quiz.id)
            .await
            .map_err(|_| QuizError::QuizDeletionFailed)?;
        if removed == 0 {
            warn!(quiz_id = %quiz.id, "quiz was gone before delete ran");
            return Err(QuizError::QuizNotFound);
        }
        info!(quiz_id = %quiz.id, "deleted quiz");
        Ok(DeletedQuiz {
            message: format!("Quiz {} and all related data have been deleted", quiz.id),
        })
    }

    async fn require_quiz(&self, quiz_id: &str) -> Result<Quiz, QuizError> {
        let Ok(id) = Uuid::parse_str(quiz_id.trim()) else {
            debug!(quiz_id, "quiz id is not a uuid");
            return Err(QuizError::QuizNotFound);
        };
        match self.store.find_quiz_by_id(id).await {
            Ok(Some(quiz)) => Ok(quiz),
            Ok(None) | Err(_) => Err(QuizError::QuizNotFound),
        }
    }

    async fn discard_quiz(&self, quiz_id: Uuid) {
        match self.store.delete_quiz_by_id(quiz_id).await {
            Ok(_) => warn!(%quiz_id, "question insert failed; quiz removed"),
            Err(err) => {
                warn!(%quiz_id, error = %err, "question insert failed and quiz could not be removed");
            }
        }
    }
}
