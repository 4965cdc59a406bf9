use serde::{Deserialize, Serialize};

/// Relay body. Both fields are optional here so a missing prompt is reported
/// as a bad request instead of a decode failure.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub user_prompt: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl RelayRequest {
    pub fn prompts(&self) -> Option<(&str, &str)> {
        let system = self.system_prompt.as_deref().filter(|p| !p.is_empty())?;
        let user = self.user_prompt.as_deref().filter(|p| !p.is_empty())?;
        Some((system, user))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelayResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub num_questions: Option<u32>,
}
