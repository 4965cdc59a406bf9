use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, types::Json};
use uuid::Uuid;

use crate::{
    common::error::ServerError,
    quiz::models::{Question, Quiz},
};

#[derive(Debug, sqlx::FromRow)]
struct QuizRow {
    id: Uuid,
    user_id: String,
    title: String,
    time_limit: i32,
    questions: Json<Vec<Question>>,
    created_at: DateTime<Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            questions: row.questions.0,
            time_limit: u32::try_from(row.time_limit).unwrap_or(0),
            created_at: row.created_at,
        }
    }
}

pub async fn create_quiz(pool: &Pool<Postgres>, quiz: &Quiz) -> Result<(), ServerError> {
    let time_limit = i32::try_from(quiz.time_limit)
        .map_err(|_| ServerError::BadRequest("Time limit is too large".into()))?;

    let row = sqlx::query(
        r#"
        INSERT INTO "quiz" (id, user_id, title, time_limit, questions, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(quiz.id)
    .bind(&quiz.user_id)
    .bind(&quiz.title)
    .bind(time_limit)
    .bind(Json(&quiz.questions))
    .bind(quiz.created_at)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to persist quiz".into()));
    }

    Ok(())
}

pub async fn get_quiz_by_id(
    pool: &Pool<Postgres>,
    user_id: &str,
    quiz_id: &Uuid,
) -> Result<Quiz, ServerError> {
    let row = sqlx::query_as::<_, QuizRow>(
        r#"
        SELECT id, user_id, title, time_limit, questions, created_at
        FROM "quiz"
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(quiz_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ServerError::NotFound(format!(
        "Quiz with id {} does not exist",
        quiz_id
    )))?;

    Ok(row.into())
}

pub async fn list_quizzes(pool: &Pool<Postgres>, user_id: &str) -> Result<Vec<Quiz>, ServerError> {
    let rows = sqlx::query_as::<_, QuizRow>(
        r#"
        SELECT id, user_id, title, time_limit, questions, created_at
        FROM "quiz"
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Quiz::from).collect())
}

pub async fn delete_quiz(
    pool: &Pool<Postgres>,
    user_id: &str,
    quiz_id: &Uuid,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "quiz"
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(quiz_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::NotFound(format!(
            "Quiz with id {} does not exist",
            quiz_id
        )));
    }

    Ok(())
}
