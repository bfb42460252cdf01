use std::{error::Error, fmt, sync::Arc};

use quiz_store::schema::DEFAULT_CREATOR_EMAIL;

use crate::store::{QuizStore, StoreError};

pub mod envelope;
pub mod quiz;

pub use envelope::{CreatedQuiz, DeletedQuiz, Envelope, QuizDetails};
pub use quiz::CreateQuizRequest;

/// Failures surfaced to tool callers inside the result envelope.
#[derive(Debug)]
pub enum QuizError {
    UserNotFound,
    QuizNotFound,
    QuizCreationFailed,
    QuestionInsertFailed,
    NoQuestionsFound,
    QuizDeletionFailed,
    Unexpected(String),
}

impl QuizError {
    /// Stable machine-readable code for the failure.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::QuizNotFound => "quiz_not_found",
            Self::QuizCreationFailed => "quiz_creation_failed",
            Self::QuestionInsertFailed => "question_insert_failed",
            Self::NoQuestionsFound => "no_questions_found",
            Self::QuizDeletionFailed => "quiz_deletion_failed",
            Self::Unexpected(_) => "unexpected_error",
        }
    }
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound => f.write_str("User not found"),
            Self::QuizNotFound => f.write_str("Quiz not found"),
            Self::QuizCreationFailed => f.write_str("Error creating quiz"),
            Self::QuestionInsertFailed => f.write_str("Error inserting questions"),
            Self::NoQuestionsFound => f.write_str("No questions found for this quiz"),
            Self::QuizDeletionFailed => f.write_str("Error deleting the quiz"),
            Self::Unexpected(message) => f.write_str(message),
        }
    }
}

impl Error for QuizError {}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

/// Quiz service over an injected store handle.
pub struct QuizControlPlane<S: QuizStore> {
    store: Arc<S>,
    creator_email: String,
}

impl<S: QuizStore> Clone for QuizControlPlane<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            creator_email: self.creator_email.clone(),
        }
    }
}

impl<S: QuizStore> QuizControlPlane<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    #[must_use]
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            creator_email: DEFAULT_CREATOR_EMAIL.to_string(),
        }
    }

    /// Overrides the placeholder creator identity.
    #[must_use]
    pub fn with_creator_email(mut self, creator_email: impl Into<String>) -> Self {
        self.creator_email = creator_email.into();
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn creator_email(&self) -> &str {
        &self.creator_email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_envelope_contract() {
        assert_eq!(QuizError::UserNotFound.to_string(), "User not found");
        assert_eq!(QuizError::QuizNotFound.to_string(), "Quiz not found");
        assert_eq!(QuizError::QuizCreationFailed.to_string(), "Error creating quiz");
        assert_eq!(
            QuizError::QuestionInsertFailed.to_string(),
            "Error inserting questions"
        );
        assert_eq!(
            QuizError::NoQuestionsFound.to_string(),
            "No questions found for this quiz"
        );
        assert_eq!(QuizError::QuizDeletionFailed.to_string(), "Error deleting the quiz");
        assert_eq!(QuizError::Unexpected("boom".into()).to_string(), "boom");
    }

    #[test]
    fn store_errors_become_unexpected() {
        let err = QuizError::from(StoreError::InvalidInput("bad".into()));
        assert_eq!(err.kind(), "unexpected_error");
        assert_eq!(err.to_string(), "invalid input: bad");
    }
}
