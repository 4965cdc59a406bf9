use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum QuizValidationError {
    #[error("Quiz title is required")]
    MissingTitle,

    #[error("Quiz needs at least one question")]
    NoQuestions,

    #[error("Question {0} has no text")]
    MissingQuestionText(usize),

    #[error("Question {0} needs at least two options")]
    TooFewOptions(usize),

    #[error("Question {0} has an empty option at position {1}")]
    EmptyOption(usize, usize),

    #[error("Question {0} has correct answer index {1} out of range")]
    CorrectAnswerOutOfRange(usize, usize),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

impl Question {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct_answer_index)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub questions: Vec<Question>,
    /// Minutes. Zero means untimed.
    pub time_limit: u32,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn time_limit_seconds(&self) -> Option<u32> {
        (self.time_limit > 0).then(|| self.time_limit.saturating_mul(60))
    }
}

/// Dashboard listing entry, questions left out.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub questions_count: usize,
    pub time_limit: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            questions_count: quiz.question_count(),
            time_limit: quiz.time_limit,
            created_at: quiz.created_at,
        }
    }
}

/// A question as exchanged with authors and the generator, before it has an id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

/// Quiz definition exchange format: `{ title, questions: [{ text, options, correctAnswerIndex }] }`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub title: String,
    pub questions: Vec<DraftQuestion>,
}

impl QuizDraft {
    pub fn validate(&self) -> Result<(), QuizValidationError> {
        if self.title.trim().is_empty() {
            return Err(QuizValidationError::MissingTitle);
        }

        if self.questions.is_empty() {
            return Err(QuizValidationError::NoQuestions);
        }

        for (idx, question) in self.questions.iter().enumerate() {
            let number = idx + 1;
            if question.text.trim().is_empty() {
                return Err(QuizValidationError::MissingQuestionText(number));
            }

            if question.options.len() < MIN_OPTIONS {
                return Err(QuizValidationError::TooFewOptions(number));
            }

            if let Some(empty) = question.options.iter().position(|o| o.trim().is_empty()) {
                return Err(QuizValidationError::EmptyOption(number, empty + 1));
            }

            if question.correct_answer_index >= question.options.len() {
                return Err(QuizValidationError::CorrectAnswerOutOfRange(
                    number,
                    question.correct_answer_index,
                ));
            }
        }

        Ok(())
    }

    pub fn into_questions(self) -> Vec<Question> {
        self.questions
            .into_iter()
            .map(|q| Question {
                id: Uuid::new_v4(),
                text: q.text,
                options: q.options,
                correct_answer_index: q.correct_answer_index,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    pub title: String,
    pub questions: Vec<DraftQuestion>,
    #[serde(default)]
    pub time_limit: Option<i64>,
}

impl CreateQuizRequest {
    pub fn into_draft(self) -> (QuizDraft, Option<i64>) {
        let draft = QuizDraft {
            title: self.title,
            questions: self.questions,
        };

        (draft, self.time_limit)
    }
}
