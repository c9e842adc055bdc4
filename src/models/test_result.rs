// src/models/test_result.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// One graded answer inside a test result.
/// `selected_option` is None for questions left blank; those never score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: i64,
    pub selected_option: Option<String>,
    pub is_correct: bool,
    /// 100 for a correct answer, 0 otherwise.
    pub score_percent: i64,
}

/// Represents the 'test_results' table.
/// A row is written exactly once, at finalization, and is immutable after.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(skip)]
    pub id: i64,
    pub user_id: i64,
    pub test_id: String,
    pub company: String,
    pub role: String,
    pub test_type: String,
    pub experience: String,
    pub duration_minutes: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub final_score_percent: i64,
    pub answers: Json<Vec<AnswerRecord>>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for result submission. The client reports its own scoring; see the
/// submit-result handler for how that trust boundary is handled.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultRequest {
    #[validate(length(min = 1, max = 64))]
    pub test_id: String,

    #[validate(length(min = 1, max = 100))]
    pub company: String,

    #[validate(length(min = 1, max = 100))]
    pub role: String,

    #[validate(length(min = 1, max = 20))]
    pub test_type: String,

    #[validate(length(min = 1, max = 20))]
    pub experience: String,

    #[validate(range(min = 1, max = 180))]
    pub duration_minutes: i64,

    #[validate(range(min = 0))]
    pub total_questions: i64,

    #[validate(range(min = 0))]
    pub correct_answers: i64,

    #[validate(range(min = 0, max = 100))]
    pub final_score_percent: i64,

    pub answers: Vec<AnswerRecord>,

    pub completed_at: chrono::DateTime<chrono::Utc>,
}
