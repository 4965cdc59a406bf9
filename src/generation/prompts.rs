use crate::generation::models::GenerateQuizRequest;

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
const MAX_QUESTION_COUNT: u32 = 50;

#[derive(Debug, PartialEq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds the instruction and task blocks for a generation request. Pasted
/// text wins over a topic. Returns `None` when neither is given.
pub fn build_prompts(request: &GenerateQuizRequest) -> Option<PromptPair> {
    let topic = request.topic.as_deref().map(str::trim).unwrap_or_default();
    let text = request.text.as_deref().map(str::trim).unwrap_or_default();

    if topic.is_empty() && text.is_empty() {
        return None;
    }

    let count = request
        .num_questions
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT);

    let user = match text.is_empty() {
        false => format!(
            "Generate a {}-question quiz based on the following text: {}",
            count, text
        ),
        true => format!(
            "Generate a {}-question quiz on the topic of: {}",
            count, topic
        ),
    };

    Some(PromptPair {
        system: system_prompt(count),
        user,
    })
}

fn system_prompt(count: u32) -> String {
    format!(
        r#"You are an expert quiz generation API. Your sole purpose is to generate a quiz
with {count} multiple-choice questions based on a user's prompt.
You MUST return ONLY a single, valid JSON object. Do not include markdown ```json or any other text.
Your JSON MUST follow this exact structure:
{{
  "title": "A creative title for the quiz",
  "questions": [
    {{
      "text": "The question text",
      "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
      "correctAnswerIndex": 0
    }}
  ]
}}
The "correctAnswerIndex" MUST be a number between 0 and 3."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_topic_or_text() {
        let request = GenerateQuizRequest {
            topic: Some("   ".into()),
            text: None,
            num_questions: Some(3),
        };

        assert!(build_prompts(&request).is_none());
    }

    #[test]
    fn text_takes_precedence_over_topic() {
        let request = GenerateQuizRequest {
            topic: Some("Planets".into()),
            text: Some("Mars is the fourth planet.".into()),
            num_questions: Some(3),
        };

        let prompts = build_prompts(&request).unwrap();
        assert_eq!(
            prompts.user,
            "Generate a 3-question quiz based on the following text: Mars is the fourth planet."
        );
        assert!(prompts.system.contains("with 3 multiple-choice questions"));
    }

    #[test]
    fn topic_prompt_uses_default_count() {
        let request = GenerateQuizRequest {
            topic: Some("React Hooks".into()),
            ..Default::default()
        };

        let prompts = build_prompts(&request).unwrap();
        assert_eq!(
            prompts.user,
            "Generate a 5-question quiz on the topic of: React Hooks"
        );
        assert!(prompts.system.contains("\"correctAnswerIndex\": 0"));
    }

    #[test]
    fn question_count_is_at_least_one() {
        let request = GenerateQuizRequest {
            topic: Some("Rust".into()),
            num_questions: Some(0),
            ..Default::default()
        };

        let prompts = build_prompts(&request).unwrap();
        assert!(prompts.user.starts_with("Generate a 1-question quiz"));
    }
}
