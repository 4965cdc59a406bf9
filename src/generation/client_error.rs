use reqwest::StatusCode;

pub const GENERIC_FAILURE: &str = "Failed to generate quiz";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to reach generation service: {0}")]
    Http(reqwest::Error),

    #[error("{1}")]
    Upstream(StatusCode, String),

    #[error("Generation service returned no text")]
    EmptyResponse,

    #[error("Failed to build http client: {0}")]
    Client(reqwest::Error),
}

impl GenerationError {
    /// Urls are stripped so nothing about the upstream request leaks into
    /// responses or logs.
    pub fn from_reqwest(error: reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            return GenerationError::Timeout(timeout_secs);
        }

        GenerationError::Http(error.without_url())
    }

    /// Message surfaced to the caller, falling back to a generic one.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        match message.trim().is_empty() {
            true => GENERIC_FAILURE.to_string(),
            false => message,
        }
    }
}
