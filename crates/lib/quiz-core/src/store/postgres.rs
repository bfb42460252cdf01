use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_store::models::{NewQuestionRow, NewQuiz, Question, QuestionBody, Quiz, UserProfile};
use quiz_store::schema::{SCHEMA_STATEMENTS, TABLE_QUESTIONS, TABLE_QUIZZES, TABLE_USER_PROFILES};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

use super::{QuizStore, StoreError, StoreResult, sort_questions};

const QUIZ_COLUMNS: &str = "id, creator_id, title, description, is_public, created_at";
const QUESTION_COLUMNS: &str = "id, quiz_id, question_type, question_text, question_data, order_index";

/// Postgres-backed store for the hosted quiz database.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool with the given options.
    ///
    /// # Errors
    /// Returns `StoreError` if the initial connection cannot be established.
    pub async fn connect(options: PgConnectOptions, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(log_failure("connecting to quiz database"))?;
        Ok(Self::new(pool))
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(log_failure("bootstrapping schema"))?;
        }
        debug!("quiz schema ensured");
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>> {
        let query = format!("SELECT id, email FROM {TABLE_USER_PROFILES} WHERE email = $1 LIMIT 1");
        let row: Option<UserRow> = sqlx::query_as(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(log_failure("fetching user"))?;
        Ok(row.map(UserProfile::from))
    }

    async fn find_quiz_by_id(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        let query = format!("SELECT {QUIZ_COLUMNS} FROM {TABLE_QUIZZES} WHERE id = $1");
        let row: Option<QuizRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(log_failure("fetching quiz"))?;
        Ok(row.map(Quiz::from))
    }

    async fn list_quizzes(&self) -> StoreResult<Vec<Quiz>> {
        let query = format!("SELECT {QUIZ_COLUMNS} FROM {TABLE_QUIZZES} ORDER BY created_at, id");
        let rows: Vec<QuizRow> = sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(log_failure("listing quizzes"))?;
        Ok(rows.into_iter().map(Quiz::from).collect())
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz> {
        let query = format!(
            "INSERT INTO {TABLE_QUIZZES} (creator_id, title, description, is_public) \
             VALUES ($1, $2, $3, $4) RETURNING {QUIZ_COLUMNS}"
        );
        let row: QuizRow = sqlx::query_as(&query)
            .bind(quiz.creator_id)
            .bind(quiz.title)
            .bind(quiz.description)
            .bind(quiz.is_public)
            .fetch_one(&self.pool)
            .await
            .map_err(log_failure("creating quiz"))?;
        Ok(row.into())
    }

    async fn delete_quiz_by_id(&self, id: Uuid) -> StoreResult<u64> {
        let query = format!("DELETE FROM {TABLE_QUIZZES} WHERE id = $1");
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(log_failure("deleting quiz"))?;
        Ok(result.rows_affected())
    }

    async fn find_questions_by_quiz_id(&self, quiz_id: Uuid) -> StoreResult<Vec<Question>> {
        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM {TABLE_QUESTIONS} WHERE quiz_id = $1 ORDER BY order_index, id"
        );
        let rows: Vec<QuestionRow> = sqlx::query_as(&query)
            .bind(quiz_id)
            .fetch_all(&self.pool)
            .await
            .map_err(log_failure("fetching questions"))?;
        decode_questions(rows)
    }

    async fn insert_questions(&self, rows: Vec<NewQuestionRow>) -> StoreResult<Vec<Question>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut quiz_ids = Vec::with_capacity(rows.len());
        let mut question_types = Vec::with_capacity(rows.len());
        let mut question_texts = Vec::with_capacity(rows.len());
        let mut question_data = Vec::with_capacity(rows.len());
        let mut order_indexes = Vec::with_capacity(rows.len());
        for row in rows {
            quiz_ids.push(row.quiz_id);
            question_types.push(row.body.question_type().as_str().to_string());
            question_data.push(row.body.data_value().map_err(|err| {
                error!(error = %err, "error encoding question payload");
                StoreError::from(err)
            })?);
            question_texts.push(row.question_text);
            order_indexes.push(row.order_index);
        }

        let query = format!(
            "INSERT INTO {TABLE_QUESTIONS} (quiz_id, question_type, question_text, question_data, order_index) \
             SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::jsonb[], $5::int4[]) \
             RETURNING {QUESTION_COLUMNS}"
        );
        let stored: Vec<QuestionRow> = sqlx::query_as(&query)
            .bind(quiz_ids)
            .bind(question_types)
            .bind(question_texts)
            .bind(question_data)
            .bind(order_indexes)
            .fetch_all(&self.pool)
            .await
            .map_err(log_failure("creating questions"))?;
        decode_questions(stored)
    }
}

fn log_failure(action: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        error!(error = %err, "error {action}");
        StoreError::from(err)
    }
}

fn decode_questions(rows: Vec<QuestionRow>) -> StoreResult<Vec<Question>> {
    let mut questions = rows
        .into_iter()
        .map(Question::try_from)
        .collect::<StoreResult<Vec<_>>>()?;
    sort_questions(&mut questions);
    Ok(questions)
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
        }
    }
}

#[derive(FromRow)]
struct QuizRow {
    id: Uuid,
    creator_id: Uuid,
    title: String,
    description: Option<String>,
    is_public: bool,
    created_at: DateTime<Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Self {
            id: row.id,
            creator_id: row.creator_id,
            title: row.title,
            description: row.description,
            is_public: row.is_public,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct QuestionRow {
    id: Uuid,
    quiz_id: Uuid,
    question_type: String,
    question_text: String,
    question_data: Value,
    order_index: i32,
}

impl TryFrom<QuestionRow> for Question {
    type Error = StoreError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let body = QuestionBody::from_parts(&row.question_type, row.question_data).map_err(|err| {
            error!(question_id = %row.id, error = %err, "stored question payload does not match its type");
            StoreError::Decode(format!("question {}: {err}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            quiz_id: row.quiz_id,
            question_text: row.question_text,
            order_index: row.order_index,
            body,
        })
    }
}
