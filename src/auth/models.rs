use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub sid: Option<String>,
}

/// The authenticated user, as identified by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subject {
    pub user_id: String,
}

impl Subject {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
        }
    }
}
