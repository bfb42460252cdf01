use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Profile row used to resolve a quiz creator by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
}

/// Quiz header row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quiz {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a quiz header row. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewQuiz {
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub is_public: bool,
}

/// Discriminant stored in the `question_type` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    FillBlank,
    ColumnMatch,
    MultipleChoice,
}

impl QuestionType {
    pub const ALL: [Self; 3] = [Self::FillBlank, Self::ColumnMatch, Self::MultipleChoice];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FillBlank => "fill_blank",
            Self::ColumnMatch => "column_match",
            Self::MultipleChoice => "multiple_choice",
        }
    }

    /// Keys of the `question_data` object for this type.
    #[must_use]
    pub const fn data_fields(self) -> &'static [&'static str] {
        match self {
            Self::FillBlank => &["text_with_blanks", "blanks"],
            Self::ColumnMatch => &["left_column", "right_column", "correct_pairs"],
            Self::MultipleChoice => &["options", "correct_index"],
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known question type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQuestionType(pub String);

impl fmt::Display for UnknownQuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown question type: {}", self.0)
    }
}

impl std::error::Error for UnknownQuestionType {}

impl FromStr for QuestionType {
    type Err = UnknownQuestionType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownQuestionType(value.to_string()))
    }
}

/// Sentence with blanks and the expected answers in blank order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FillBlankData {
    pub text_with_blanks: String,
    pub blanks: Vec<String>,
}

/// Two columns to match; `correct_pairs` maps a left index to a right index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ColumnMatchData {
    pub left_column: Vec<String>,
    pub right_column: Vec<String>,
    #[serde(deserialize_with = "index_pairs::deserialize")]
    #[schemars(with = "BTreeMap<u32, u32>")]
    pub correct_pairs: BTreeMap<u32, u32>,
}

/// JSON object keys are always strings, and flattened or tagged payloads are
/// buffered before they reach the map, so keys are parsed by hand.
mod index_pairs {
    use std::collections::BTreeMap;
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};
    use serde::Deserialize;

    #[derive(PartialEq, Eq, PartialOrd, Ord)]
    struct IndexKey(u32);

    struct IndexKeyVisitor;

    impl Visitor<'_> for IndexKeyVisitor {
        type Value = IndexKey;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer index")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            u32::try_from(value)
                .map(IndexKey)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            u32::try_from(value)
                .map(IndexKey)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value
                .trim()
                .parse::<u32>()
                .map(IndexKey)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    impl<'de> Deserialize<'de> for IndexKey {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(IndexKeyVisitor)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<u32, u32>, D::Error> {
        let raw = BTreeMap::<IndexKey, u32>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|(key, value)| (key.0, value)).collect())
    }
}

/// Options with the index of the correct one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MultipleChoiceData {
    pub options: Vec<String>,
    pub correct_index: u32,
}

/// Type-specific question payload.
///
/// On the wire this is the pair `{"question_type": ..., "question_data": {...}}`,
/// so a payload whose shape does not match its declared type fails to parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(tag = "question_type", content = "question_data", rename_all = "snake_case")]
pub enum QuestionBody {
    FillBlank(FillBlankData),
    ColumnMatch(ColumnMatchData),
    MultipleChoice(MultipleChoiceData),
}

impl QuestionBody {
    #[must_use]
    pub const fn question_type(&self) -> QuestionType {
        match self {
            Self::FillBlank(_) => QuestionType::FillBlank,
            Self::ColumnMatch(_) => QuestionType::ColumnMatch,
            Self::MultipleChoice(_) => QuestionType::MultipleChoice,
        }
    }

    /// Serializes the type-specific payload as stored in `question_data`.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if the payload cannot be represented as JSON.
    pub fn data_value(&self) -> serde_json::Result<Value> {
        match self {
            Self::FillBlank(data) => serde_json::to_value(data),
            Self::ColumnMatch(data) => serde_json::to_value(data),
            Self::MultipleChoice(data) => serde_json::to_value(data),
        }
    }

    /// Rebuilds a body from the stored `question_type` and `question_data` columns.
    ///
    /// Stored rows may carry keys written by other clients of the table; keys the
    /// type does not define are dropped instead of failing the read.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if the type is unknown or a required key is
    /// missing or malformed.
    pub fn from_parts(question_type: &str, question_data: Value) -> serde_json::Result<Self> {
        let question_data = match (question_type.parse::<QuestionType>(), question_data) {
            (Ok(kind), Value::Object(mut fields)) => {
                fields.retain(|key, _| kind.data_fields().contains(&key.as_str()));
                Value::Object(fields)
            }
            (_, other) => other,
        };
        serde_json::from_value(serde_json::json!({
            "question_type": question_type,
            "question_data": question_data,
        }))
    }
}

/// Question row as stored, with its payload decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_text: String,
    pub order_index: i32,
    #[serde(flatten)]
    pub body: QuestionBody,
}

/// Caller-supplied question, as accepted by `create_quiz`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct NewQuestion {
    /// Prompt shown to the quiz taker.
    pub question_text: String,
    /// Position of the question inside the quiz.
    pub order_index: i32,
    #[serde(flatten)]
    pub body: QuestionBody,
}

/// Insert payload for one question row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionRow {
    pub quiz_id: Uuid,
    pub question_text: String,
    pub order_index: i32,
    pub body: QuestionBody,
}

impl NewQuestionRow {
    #[must_use]
    pub fn for_quiz(quiz_id: Uuid, question: NewQuestion) -> Self {
        Self {
            quiz_id,
            question_text: question.question_text,
            order_index: question.order_index,
            body: question.body,
        }
    }
}
