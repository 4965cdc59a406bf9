use crate::quiz::models::{QuizDraft, QuizValidationError};

#[derive(Debug, thiserror::Error)]
pub enum QuizFormatError {
    #[error("Response is not a quiz object: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(#[from] QuizValidationError),
}

/// Removes a leading ``` fence (with or without a language tag) and a
/// trailing ``` from model output. The fence may share its line with the body.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }

    if let Some(stripped) = text.trim_end().strip_suffix("```") {
        text = stripped;
    }

    text.trim()
}

pub fn parse_quiz_draft(raw: &str) -> Result<QuizDraft, QuizFormatError> {
    let draft: QuizDraft = serde_json::from_str(strip_code_fences(raw))?;
    draft.validate()?;
    Ok(draft)
}
