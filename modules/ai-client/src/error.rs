use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider refused the request on content-policy grounds.
    /// Never retried; callers surface it as its own category.
    #[error("Content policy refusal: {0}")]
    ContentPolicy(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl AiError {
    /// Classify a non-success HTTP response body. Providers report policy
    /// refusals as 400s with a recognisable code in the body.
    pub fn from_status(status: u16, body: String) -> Self {
        let lower = body.to_lowercase();
        if lower.contains("content_policy_violation")
            || lower.contains("safety system")
            || lower.contains("moderation_blocked")
        {
            AiError::ContentPolicy(body)
        } else {
            AiError::Api {
                status,
                message: body,
            }
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_body_maps_to_content_policy() {
        let err = AiError::from_status(
            400,
            r#"{"error":{"code":"content_policy_violation","message":"nope"}}"#.to_string(),
        );
        assert!(matches!(err, AiError::ContentPolicy(_)));
    }

    #[test]
    fn other_body_maps_to_api_error() {
        let err = AiError::from_status(500, "internal".to_string());
        assert!(matches!(err, AiError::Api { status: 500, .. }));
    }
}
