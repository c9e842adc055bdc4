// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

use crate::session::SessionQuestion;

/// Represents the 'questions' table: the bank tests are drawn from.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Question category: 'technical' or 'behavioral'.
    pub question_type: String,

    /// The text content of the question.
    pub content: String,

    /// List of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// The correct answer, matched against submissions by trimmed,
    /// case-insensitive comparison.
    pub answer: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Wire DTO for a question issued to a running test.
///
/// The correct answer ships with the question: scoring is client-side in the
/// observed flow, and the server only recounts to flag disagreements.
#[derive(Debug, Serialize)]
pub struct IssuedQuestion {
    #[serde(rename = "_id")]
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

impl From<&Question> for IssuedQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question: q.content.clone(),
            options: q.options.0.clone(),
            correct_answer: q.answer.clone(),
        }
    }
}

impl From<&Question> for SessionQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            prompt: q.content.clone(),
            options: q.options.0.clone(),
            correct_answer: q.answer.clone(),
        }
    }
}
