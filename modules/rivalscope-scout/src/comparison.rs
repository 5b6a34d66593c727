use std::time::Duration;

use tracing::{info, warn};

use ai_client::{AiError, GeneratedImage};
use rivalscope_common::{AnalysisResult, RivalScopeError};

use crate::traits::ImageGenerator;

const MAX_BRANDS_IN_PROMPT: usize = 4;

pub fn comparison_prompt(analysis: &AnalysisResult) -> String {
    let brands: Vec<&str> = analysis
        .summary
        .top_brands
        .iter()
        .take(MAX_BRANDS_IN_PROMPT)
        .map(String::as_str)
        .collect();
    let brands = if brands.is_empty() {
        analysis
            .competitors
            .iter()
            .take(MAX_BRANDS_IN_PROMPT)
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        brands.join(", ")
    };

    format!(
        "A clean studio product comparison infographic for the {category} category. \
         Show a generic unbranded hero product inspired by: {description}. \
         Arrange it side by side with product silhouettes representing {brands}. \
         Neutral background, soft lighting, minimal labels, no real logos.",
        category = analysis.category,
        description = analysis.image_description,
    )
}

/// Render the comparison image. A content-policy refusal is reported to the
/// caller; any other failure just means there is no image.
pub async fn render_comparison(
    generator: &dyn ImageGenerator,
    analysis: &AnalysisResult,
    timeout: Duration,
) -> Result<Option<GeneratedImage>, RivalScopeError> {
    let prompt = comparison_prompt(analysis);
    match tokio::time::timeout(timeout, generator.generate_image(&prompt)).await {
        Ok(Ok(image)) => {
            info!(mime_type = %image.mime_type, bytes = image.data.len(), "Comparison image generated");
            Ok(Some(image))
        }
        Ok(Err(e)) => match e.downcast_ref::<AiError>() {
            Some(AiError::ContentPolicy(message)) => {
                Err(RivalScopeError::ContentPolicy(message.clone()))
            }
            _ => {
                warn!(error = %e, "Comparison image failed, omitting it");
                Ok(None)
            }
        },
        Err(_) => {
            warn!("Comparison image timed out, omitting it");
            Ok(None)
        }
    }
}
