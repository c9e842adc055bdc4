// src/handlers/dashboard.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError, handlers::mock_test::fetch_results_for_user, models::test_result::TestResult,
    utils::jwt::Claims,
};

/// Aggregate statistics over a user's valid test history.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tests: i64,
    pub average_score: i64,
    pub highest_score: i64,
    pub total_time_minutes: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub accuracy: i64,
}

/// Returns filtered aggregates for the caller's dashboard.
pub async fn get_stats(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = fetch_results_for_user(&pool, claims.user_id()).await?;

    Ok(Json(json!({
        "success": true,
        "stats": aggregate(&results),
    })))
}

/// Derives dashboard statistics from a result history.
///
/// Results with no questions or an out-of-range score carry no signal and
/// are excluded from every aggregate, numerator and denominator alike.
/// Scores are stored as integers, so the consumer's finite-number guard
/// reduces to the 0..=100 range check; that also rejects finite scores
/// outside the percentage range, which is deliberately stricter than the
/// consuming dashboard needs.
pub fn aggregate(results: &[TestResult]) -> DashboardStats {
    let valid: Vec<&TestResult> = results
        .iter()
        .filter(|r| r.total_questions > 0 && (0..=100).contains(&r.final_score_percent))
        .collect();

    if valid.is_empty() {
        return DashboardStats::default();
    }

    let total_tests = valid.len() as i64;
    let score_sum: i64 = valid.iter().map(|r| r.final_score_percent).sum();
    let highest_score = valid
        .iter()
        .map(|r| r.final_score_percent)
        .max()
        .unwrap_or(0);
    let total_time_minutes: i64 = valid.iter().map(|r| r.duration_minutes).sum();
    let total_questions: i64 = valid.iter().map(|r| r.total_questions).sum();
    let correct_answers: i64 = valid.iter().map(|r| r.correct_answers).sum();

    DashboardStats {
        total_tests,
        average_score: (score_sum as f64 / total_tests as f64).round() as i64,
        highest_score,
        total_time_minutes,
        total_questions,
        correct_answers,
        accuracy: ((correct_answers as f64 / total_questions as f64) * 100.0).round() as i64,
    }
}
