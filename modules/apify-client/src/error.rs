use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApifyError>;

#[derive(Debug, Error)]
pub enum ApifyError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Apify returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Could not decode Apify response: {0}")]
    Decode(String),

    /// Run reached FAILED, ABORTED or TIMED-OUT.
    #[error("Actor run {run_id} ended as {status}")]
    RunFailed { run_id: String, status: String },
}

impl ApifyError {
    /// Transport-level failures worth retrying on the next request.
    pub fn is_transient(&self) -> bool {
        match self {
            ApifyError::Http(_) | ApifyError::Timeout(_) => true,
            ApifyError::Api { status, .. } => *status == 429 || *status >= 500,
            ApifyError::Decode(_) | ApifyError::RunFailed { .. } => false,
        }
    }
}

impl From<reqwest::Error> for ApifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApifyError::Timeout(err.to_string())
        } else if err.is_decode() {
            ApifyError::Decode(err.to_string())
        } else {
            ApifyError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApifyError {
    fn from(err: serde_json::Error) -> Self {
        ApifyError::Decode(err.to_string())
    }
}
