use std::time::Duration;

use rivalscope_common::Config;

/// Timeouts and limits the pipeline runs under.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub adapter_timeout: Duration,
    pub extraction_timeout: Duration,
    pub generation_timeout: Duration,
    /// Overall budget for one analysis request. `None` waits for every stage.
    pub request_deadline: Option<Duration>,
    /// Max social URLs analyzed per request; extras are ignored.
    pub max_social_urls: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(45),
            extraction_timeout: Duration::from_secs(60),
            generation_timeout: Duration::from_secs(30),
            request_deadline: Some(Duration::from_secs(120)),
            max_social_urls: 10,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            adapter_timeout: config.adapter_timeout,
            extraction_timeout: config.extraction_timeout,
            generation_timeout: config.generation_timeout,
            request_deadline: Some(config.request_deadline),
            ..Self::default()
        }
    }

    pub fn with_request_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.request_deadline = deadline;
        self
    }
}
