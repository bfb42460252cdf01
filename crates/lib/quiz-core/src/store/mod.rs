//! Data access layer.
//!
//! One narrow call per table operation. `Ok(None)` and empty vectors mean the
//! store answered with zero rows; `Err(StoreError)` means the call itself failed.
//! Implementations log every failure before returning it.

pub mod memory;
pub mod postgres;

use std::{error::Error, fmt};

use async_trait::async_trait;
use quiz_store::models::{NewQuestionRow, NewQuiz, Question, Quiz, UserProfile};
use uuid::Uuid;

pub use memory::MemoryQuizStore;
pub use postgres::PgQuizStore;

#[derive(Debug)]
pub enum StoreError {
    Database(Box<sqlx::Error>),
    Decode(String),
    InvalidInput(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(err) => write!(f, "database error: {err}"),
            Self::Decode(message) => write!(f, "stored row could not be decoded: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Database(err) => Some(err.as_ref()),
            Self::Decode(_) | Self::InvalidInput(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(Box::new(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Table operations backing the quiz service.
#[async_trait]
pub trait QuizStore: Send + Sync + 'static {
    /// Creates the tables if they are missing.
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Looks up a user profile by exact email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>>;

    /// Fetches a quiz header by id.
    async fn find_quiz_by_id(&self, id: Uuid) -> StoreResult<Option<Quiz>>;

    /// Fetches every quiz, oldest first.
    async fn list_quizzes(&self) -> StoreResult<Vec<Quiz>>;

    /// Inserts a quiz header and returns the stored row.
    async fn insert_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz>;

    /// Deletes a quiz by id and returns the number of quiz rows removed.
    /// Dependent questions go with it through the cascade rule.
    async fn delete_quiz_by_id(&self, id: Uuid) -> StoreResult<u64>;

    /// Fetches the questions of a quiz ordered by `order_index`.
    async fn find_questions_by_quiz_id(&self, quiz_id: Uuid) -> StoreResult<Vec<Question>>;

    /// Inserts all rows in one call and returns the stored rows.
    async fn insert_questions(&self, rows: Vec<NewQuestionRow>) -> StoreResult<Vec<Question>>;
}

/// Deterministic read order for questions.
pub(crate) fn sort_questions(questions: &mut [Question]) {
    questions.sort_by(|left, right| {
        left.order_index
            .cmp(&right.order_index)
            .then_with(|| left.id.cmp(&right.id))
    });
}
