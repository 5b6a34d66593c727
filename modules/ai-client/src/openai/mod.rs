mod client;
pub(crate) mod types;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::AiError;
use crate::traits::EmbedAgent;
use client::OpenAiClient;

/// A generated image, base64-encoded.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub data: String,
    pub mime_type: String,
}

// =============================================================================
// OpenAi
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    embedding_model: String,
    image_model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            embedding_model: "text-embedding-3-small".to_string(),
            image_model: "gpt-image-1".to_string(),
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key, self.http.clone());
        match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        }
    }

    /// Generate one square PNG from a text prompt.
    ///
    /// Policy refusals come back as `AiError::ContentPolicy` inside the
    /// `anyhow::Error`; callers can `downcast_ref` to tell them apart.
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = types::ImageRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: "1024x1024".to_string(),
        };

        let data = self.client().generate_image(&request).await?;

        Ok(GeneratedImage {
            data,
            mime_type: "image/png".to_string(),
        })
    }
}

#[async_trait]
impl EmbedAgent for OpenAi {
    async fn embed(&self, text: impl Into<String> + Send) -> Result<Vec<f32>> {
        let texts = vec![text.into()];
        self.client()
            .embed_batch(&self.embedding_model, &texts)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AiError::EmptyResponse("no embedding in response".to_string()).into())
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.client()
            .embed_batch(&self.embedding_model, &texts)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let ai = OpenAi::new("sk-test");
        assert_eq!(ai.embedding_model(), "text-embedding-3-small");
        assert_eq!(ai.image_model, "gpt-image-1");
        assert!(ai.base_url.is_none());
    }

    #[test]
    fn test_openai_with_embedding_model() {
        let ai = OpenAi::new("sk-test")
            .with_embedding_model("voyage-3-large")
            .with_base_url("https://api.voyageai.com/v1");
        assert_eq!(ai.embedding_model(), "voyage-3-large");
        assert_eq!(ai.base_url.as_deref(), Some("https://api.voyageai.com/v1"));
    }
}
