use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    quiz::models::{Question, Quiz},
    session::models::{DefaultAnswer, QuizResult, SessionStatus, percentage},
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("Cannot start a quiz without questions")]
    EmptyQuiz,

    #[error("The quiz session is already finished")]
    Finished,

    #[error("Option {index} does not exist, question has {options} options")]
    InvalidArgument { index: i64, options: usize },
}

/// Outcome of one countdown tick.
#[derive(Debug, PartialEq)]
pub enum Tick {
    /// The session has no time limit.
    Untimed,
    Remaining(u32),
    /// This tick used up the last second and submitted the session.
    Expired(QuizResult),
    /// The session was already finished, the countdown should stop.
    Stopped,
}

/// One attempt at a quiz. Constructed active, moves forward only, and
/// finishes exactly once either by the caller or by the countdown.
#[derive(Debug)]
pub struct QuizSession {
    quiz_id: Uuid,
    title: String,
    questions: Vec<Question>,
    current_index: usize,
    selected_answers: Vec<Option<usize>>,
    remaining_seconds: Option<u32>,
    default_answer: DefaultAnswer,
    started_at: DateTime<Utc>,
    result: Option<QuizResult>,
}

impl QuizSession {
    pub fn start(quiz: &Quiz, default_answer: DefaultAnswer) -> Result<Self, SessionError> {
        if quiz.questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }

        let slots = quiz.question_count();

        Ok(Self {
            quiz_id: quiz.id,
            title: quiz.title.clone(),
            questions: quiz.questions.clone(),
            current_index: 0,
            selected_answers: vec![default_answer.initial_slot(); slots],
            remaining_seconds: quiz.time_limit_seconds(),
            default_answer,
            started_at: Utc::now(),
            result: None,
        })
    }

    /// Takes the index as sent by the client, so negative values are
    /// rejected here like any other option that does not exist.
    pub fn select_answer(&mut self, option_index: i64) -> Result<(), SessionError> {
        self.ensure_active()?;

        let options = self.current_question().option_count();
        let Some(index) = usize::try_from(option_index).ok().filter(|i| *i < options) else {
            return Err(SessionError::InvalidArgument {
                index: option_index,
                options,
            });
        };

        self.selected_answers[self.current_index] = Some(index);
        Ok(())
    }

    /// Moves to the next question. On the last question this does nothing,
    /// the caller is expected to finish instead.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;

        if self.is_last_question() {
            return Ok(());
        }

        self.current_index += 1;
        if self.selected_answers[self.current_index].is_none() {
            self.selected_answers[self.current_index] = self.default_answer.initial_slot();
        }

        Ok(())
    }

    /// Returns the result only on the call that actually finished the session.
    pub fn finish(&mut self) -> Option<QuizResult> {
        if self.result.is_some() {
            return None;
        }

        Some(self.complete(false))
    }

    pub fn tick(&mut self) -> Tick {
        if self.result.is_some() {
            return Tick::Stopped;
        }

        let Some(remaining) = self.remaining_seconds else {
            return Tick::Untimed;
        };

        let remaining = remaining.saturating_sub(1);
        self.remaining_seconds = Some(remaining);

        if remaining > 0 {
            return Tick::Remaining(remaining);
        }

        Tick::Expired(self.complete(true))
    }

    fn complete(&mut self, expired: bool) -> QuizResult {
        let correctness: Vec<bool> = self
            .questions
            .iter()
            .zip(self.selected_answers.iter())
            .map(|(question, answer)| question.is_correct(*answer))
            .collect();

        let score = correctness.iter().filter(|correct| **correct).count();
        let total_questions = self.questions.len();
        let completed_at = Utc::now();

        let result = QuizResult {
            score,
            total_questions,
            percentage: percentage(score, total_questions),
            correctness,
            answers: self.selected_answers.clone(),
            expired,
            time_spent_seconds: (completed_at - self.started_at).num_seconds(),
            completed_at,
        };

        self.result = Some(result.clone());
        result
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.result {
            Some(_) => Err(SessionError::Finished),
            None => Ok(()),
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.result {
            Some(_) => SessionStatus::Finished,
            None => SessionStatus::Active,
        }
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_timed(&self) -> bool {
        self.remaining_seconds.is_some()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn selected_answer(&self) -> Option<usize> {
        self.selected_answers[self.current_index]
    }

    pub fn selected_answers(&self) -> &[Option<usize>] {
        &self.selected_answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}
