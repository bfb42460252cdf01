pub const TABLE_QUIZZES: &str = "quizzes";
pub const TABLE_QUESTIONS: &str = "questions";
pub const TABLE_USER_PROFILES: &str = "user_profiles";

/// Placeholder creator identity used until callers carry their own identity.
pub const DEFAULT_CREATOR_EMAIL: &str = "mcp@example.com";

/// Idempotent DDL for the three tables.
///
/// Deleting a quiz removes its questions through the `ON DELETE CASCADE` rule on
/// `questions.quiz_id`; the service never deletes question rows itself.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS user_profiles (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email TEXT NOT NULL UNIQUE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS quizzes (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        creator_id UUID NOT NULL REFERENCES user_profiles(id),
        title TEXT NOT NULL,
        description TEXT,
        is_public BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS questions (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        quiz_id UUID NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
        question_type TEXT NOT NULL
            CHECK (question_type IN ('fill_blank', 'column_match', 'multiple_choice')),
        question_text TEXT NOT NULL,
        question_data JSONB NOT NULL,
        order_index INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS questions_quiz_id_idx ON questions (quiz_id, order_index)",
];
