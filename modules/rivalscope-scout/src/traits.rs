// Trait seams for the external collaborators the pipeline talks to.
//
// ImageDescriber   — image understanding (vision model)
// TextGenerator    — claims extraction, verification, retrieval answers
// RetrievalBackend — optional retrieval-augmented question answering
// ImageGenerator   — opaque competitive-comparison image
//
// Production impls wrap ai_client; tests use the mocks in `testing`.

use anyhow::Result;
use async_trait::async_trait;

use ai_client::{Claude, GeneratedImage, OpenAi};

// ---------------------------------------------------------------------------
// ImageDescriber
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String>;
}

#[async_trait]
impl ImageDescriber for Claude {
    async fn describe(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        self.describe_image(image, mime_type, prompt).await
    }
}

// ---------------------------------------------------------------------------
// TextGenerator
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// `context` frames the task (system prompt); `prompt` carries the data.
    async fn generate(&self, prompt: &str, context: &str) -> Result<String>;
}

#[async_trait]
impl TextGenerator for Claude {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String> {
        self.chat_completion(context, prompt).await
    }
}

// ---------------------------------------------------------------------------
// RetrievalBackend
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Answer `question` using only `corpus` as grounding.
    async fn query(&self, corpus: &[String], question: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// ImageGenerator
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}

#[async_trait]
impl ImageGenerator for OpenAi {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        OpenAi::generate_image(self, prompt).await
    }
}
