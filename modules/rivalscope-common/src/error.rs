use thiserror::Error;

/// Failure taxonomy for the analysis pipeline.
///
/// Only `Configuration`, `Validation`, `ContentPolicy` and `ImageUnderstanding`
/// ever reach a caller. `Adapter` and `AnalysisBackend` are absorbed inside the
/// pipeline and exist so the absorbing code can log a typed value.
#[derive(Error, Debug)]
pub enum RivalScopeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Content policy refusal: {0}")]
    ContentPolicy(String),

    #[error("Image understanding failed: {0}")]
    ImageUnderstanding(String),

    #[error("Adapter {adapter} failed: {message}")]
    Adapter { adapter: String, message: String },

    #[error("Analysis backend error: {0}")]
    AnalysisBackend(String),
}

impl RivalScopeError {
    /// Stable machine-readable label for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            RivalScopeError::Configuration(_) => "configuration",
            RivalScopeError::Validation(_) => "validation",
            RivalScopeError::ContentPolicy(_) => "content_policy",
            RivalScopeError::ImageUnderstanding(_) => "image_understanding",
            RivalScopeError::Adapter { .. } => "adapter",
            RivalScopeError::AnalysisBackend(_) => "analysis_backend",
        }
    }

    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            RivalScopeError::Adapter { .. } | RivalScopeError::AnalysisBackend(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorbed_errors_are_not_user_facing() {
        let adapter = RivalScopeError::Adapter {
            adapter: "fixture".into(),
            message: "boom".into(),
        };
        assert!(!adapter.is_user_facing());
        assert!(!RivalScopeError::AnalysisBackend("x".into()).is_user_facing());
        assert!(RivalScopeError::Validation("x".into()).is_user_facing());
        assert!(RivalScopeError::ContentPolicy("x".into()).is_user_facing());
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(RivalScopeError::Configuration("k".into()).kind(), "configuration");
        assert_eq!(RivalScopeError::ContentPolicy("k".into()).kind(), "content_policy");
    }
}
