use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use quiz_store::models::{NewQuestionRow, NewQuiz, Question, Quiz, UserProfile};
use tokio::sync::RwLock;
use tracing::error;
use uuid::Uuid;

use super::{QuizStore, StoreError, StoreResult, sort_questions};

/// In-process store with the same referential rules as the hosted schema.
///
/// Used by tests and by the daemon's in-memory mode.
#[derive(Clone, Default)]
pub struct MemoryQuizStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserProfile>,
    quizzes: HashMap<Uuid, Quiz>,
    questions: HashMap<Uuid, Question>,
}

impl MemoryQuizStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user profile and returns its id. Re-adding an email returns the existing id.
    pub async fn seed_user(&self, email: &str) -> Uuid {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.values().find(|user| user.email == email) {
            return existing.id;
        }
        let id = Uuid::new_v4();
        tables.users.insert(
            id,
            UserProfile {
                id,
                email: email.to_string(),
            },
        );
        id
    }

    /// Number of stored question rows, across all quizzes.
    pub async fn question_count(&self) -> usize {
        self.tables.read().await.questions.len()
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn find_quiz_by_id(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        Ok(self.tables.read().await.quizzes.get(&id).cloned())
    }

    async fn list_quizzes(&self) -> StoreResult<Vec<Quiz>> {
        let tables = self.tables.read().await;
        let mut quizzes: Vec<Quiz> = tables.quizzes.values().cloned().collect();
        quizzes.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(quizzes)
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&quiz.creator_id) {
            error!(creator_id = %quiz.creator_id, "error creating quiz: creator does not exist");
            return Err(StoreError::InvalidInput(format!(
                "creator {} does not exist",
                quiz.creator_id
            )));
        }
        let stored = Quiz {
            id: Uuid::new_v4(),
            creator_id: quiz.creator_id,
            title: quiz.title,
            description: Some(quiz.description),
            is_public: quiz.is_public,
            created_at: Utc::now(),
        };
        tables.quizzes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_quiz_by_id(&self, id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        if tables.quizzes.remove(&id).is_none() {
            return Ok(0);
        }
        tables.questions.retain(|_, question| question.quiz_id != id);
        Ok(1)
    }

    async fn find_questions_by_quiz_id(&self, quiz_id: Uuid) -> StoreResult<Vec<Question>> {
        let tables = self.tables.read().await;
        let mut questions: Vec<Question> = tables
            .questions
            .values()
            .filter(|question| question.quiz_id == quiz_id)
            .cloned()
            .collect();
        sort_questions(&mut questions);
        Ok(questions)
    }

    async fn insert_questions(&self, rows: Vec<NewQuestionRow>) -> StoreResult<Vec<Question>> {
        let mut tables = self.tables.write().await;
        // All-or-nothing, like a single INSERT statement.
        if let Some(orphan) = rows
            .iter()
            .find(|row| !tables.quizzes.contains_key(&row.quiz_id))
        {
            error!(quiz_id = %orphan.quiz_id, "error creating questions: quiz does not exist");
            return Err(StoreError::InvalidInput(format!(
                "quiz {} does not exist",
                orphan.quiz_id
            )));
        }

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let question = Question {
                id: Uuid::new_v4(),
                quiz_id: row.quiz_id,
                question_text: row.question_text,
                order_index: row.order_index,
                body: row.body,
            };
            tables.questions.insert(question.id, question.clone());
            stored.push(question);
        }
        Ok(stored)
    }
}
