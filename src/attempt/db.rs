use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, types::Json};
use uuid::Uuid;

use crate::{
    attempt::models::QuizAttempt,
    common::error::ServerError,
    session::models::{QuizResult, percentage},
};

#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    id: Uuid,
    quiz_id: Uuid,
    quiz_title: String,
    score: i32,
    total_questions: i32,
    answers: Json<Vec<Option<usize>>>,
    time_spent_seconds: i64,
    expired: bool,
    completed_at: DateTime<Utc>,
}

impl From<AttemptRow> for QuizAttempt {
    fn from(row: AttemptRow) -> Self {
        let score = u32::try_from(row.score).unwrap_or(0);
        let total_questions = u32::try_from(row.total_questions).unwrap_or(0);

        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            score,
            total_questions,
            percentage: percentage(score as usize, total_questions as usize),
            answers: row.answers.0,
            time_spent_seconds: row.time_spent_seconds,
            expired: row.expired,
            completed_at: row.completed_at,
        }
    }
}

pub async fn create_attempt(
    pool: &Pool<Postgres>,
    user_id: &str,
    quiz_id: Uuid,
    quiz_title: &str,
    result: &QuizResult,
) -> Result<Uuid, ServerError> {
    let id = Uuid::new_v4();
    let score = i32::try_from(result.score)
        .map_err(|_| ServerError::Internal("Score is out of range".into()))?;
    let total_questions = i32::try_from(result.total_questions)
        .map_err(|_| ServerError::Internal("Question count is out of range".into()))?;

    let row = sqlx::query(
        r#"
        INSERT INTO "quiz_attempt"
            (id, quiz_id, user_id, quiz_title, score, total_questions, answers, time_spent_seconds, expired, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(quiz_id)
    .bind(user_id)
    .bind(quiz_title)
    .bind(score)
    .bind(total_questions)
    .bind(Json(&result.answers))
    .bind(result.time_spent_seconds.max(0))
    .bind(result.expired)
    .bind(result.completed_at)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to persist quiz attempt".into()));
    }

    Ok(id)
}

pub async fn list_attempts(
    pool: &Pool<Postgres>,
    user_id: &str,
    quiz_id: Option<Uuid>,
) -> Result<Vec<QuizAttempt>, ServerError> {
    let rows = sqlx::query_as::<_, AttemptRow>(
        r#"
        SELECT id, quiz_id, quiz_title, score, total_questions, answers, time_spent_seconds, expired, completed_at
        FROM "quiz_attempt"
        WHERE user_id = $1 AND ($2::uuid IS NULL OR quiz_id = $2)
        ORDER BY completed_at DESC
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(QuizAttempt::from).collect())
}
