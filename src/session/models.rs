use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{quiz::models::Question, session::machine::QuizSession};

/// What an answer slot holds before the user picks anything.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAnswer {
    /// Slots are pre-filled with option 0, so a skipped question scores as if
    /// the first option was chosen.
    #[default]
    FirstOption,
    /// Slots stay empty and a skipped question scores as wrong.
    Unanswered,
}

impl DefaultAnswer {
    pub fn initial_slot(&self) -> Option<usize> {
        match self {
            DefaultAnswer::FirstOption => Some(0),
            DefaultAnswer::Unanswered => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Finished,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub correctness: Vec<bool>,
    pub answers: Vec<Option<usize>>,
    /// True when the countdown ran out and submitted the session.
    pub expired: bool,
    pub time_spent_seconds: i64,
    pub completed_at: DateTime<Utc>,
}

pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }

    ((score as f64 / total as f64) * 100.0).round() as u32
}

/// The current question without its correct answer.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            options: question.options.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub quiz_id: Uuid,
    pub title: String,
    pub status: SessionStatus,
    pub current_index: usize,
    pub question_count: usize,
    pub is_last_question: bool,
    pub question: Option<QuestionView>,
    pub selected_answer: Option<usize>,
    pub remaining_seconds: Option<u32>,
    pub result: Option<QuizResult>,
}

impl SessionView {
    pub fn from_session(session_id: Uuid, session: &QuizSession) -> Self {
        let status = session.status();
        let question = match status {
            SessionStatus::Active => Some(QuestionView::from(session.current_question())),
            SessionStatus::Finished => None,
        };

        Self {
            session_id,
            quiz_id: session.quiz_id(),
            title: session.title().to_string(),
            status,
            current_index: session.current_index(),
            question_count: session.question_count(),
            is_last_question: session.is_last_question(),
            question,
            selected_answer: session.selected_answer(),
            remaining_seconds: session.remaining_seconds(),
            result: session.result().cloned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectAnswerRequest {
    pub option_index: i64,
}
