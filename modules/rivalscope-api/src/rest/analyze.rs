use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{info, warn};

use rivalscope_common::{AnalysisResult, RivalScopeError};
use rivalscope_scout::comparison::render_comparison;
use rivalscope_scout::AnalysisRequest;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonImage {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_image: Option<ComparisonImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

pub fn status_for(err: &RivalScopeError) -> StatusCode {
    match err {
        RivalScopeError::Validation(_) => StatusCode::BAD_REQUEST,
        RivalScopeError::ContentPolicy(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RivalScopeError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        RivalScopeError::ImageUnderstanding(_) => StatusCode::BAD_GATEWAY,
        RivalScopeError::Adapter { .. } | RivalScopeError::AnalysisBackend(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &RivalScopeError, analysis: Option<AnalysisResult>) -> Response {
    (
        status_for(err),
        Json(AnalyzeResponse {
            success: false,
            analysis,
            comparison_image: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }),
    )
        .into_response()
}

/// Parsed multipart form.
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub image: Option<(Vec<u8>, String)>,
    pub hint: Option<String>,
    pub social_urls: Vec<String>,
    pub comparison_image: bool,
}

/// Newline- or comma-separated list; blanks dropped.
pub fn split_urls(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

fn truthy(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, RivalScopeError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        RivalScopeError::Validation(format!("malformed multipart body: {e}"))
    };

    let mut form = AnalyzeForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                form.image = Some((bytes.to_vec(), mime));
            }
            "hint" => {
                let text = field.text().await.map_err(invalid)?;
                if !text.trim().is_empty() {
                    form.hint = Some(text.trim().to_string());
                }
            }
            "social_urls" => {
                let text = field.text().await.map_err(invalid)?;
                form.social_urls.extend(split_urls(&text));
            }
            "comparison_image" => {
                form.comparison_image = truthy(&field.text().await.map_err(invalid)?);
            }
            other => warn!(field = other, "Ignoring unknown form field"),
        }
    }
    Ok(form)
}

pub async fn api_analyze(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => return error_response(&e, None),
    };
    let Some((image, mime_type)) = form.image else {
        return error_response(
            &RivalScopeError::Validation("missing 'image' field".to_string()),
            None,
        );
    };

    let pipeline = match state.pipeline() {
        Ok(p) => p,
        Err(e) => return error_response(&e, None),
    };

    let mut request = AnalysisRequest::new(image, mime_type).with_social_urls(form.social_urls);
    if let Some(hint) = form.hint {
        request = request.with_hint(hint);
    }

    let analysis = match pipeline.coordinator.run(&request).await {
        Ok(analysis) => analysis,
        Err(e) => return error_response(&e, None),
    };
    info!(
        category = %analysis.category,
        ads = analysis.summary.total_ads_scraped,
        insights = analysis.insights.len(),
        "Analysis complete"
    );

    let mut comparison_image = None;
    if form.comparison_image {
        match &pipeline.image_generator {
            Some(generator) => {
                match render_comparison(
                    generator.as_ref(),
                    &analysis,
                    pipeline.options.generation_timeout,
                )
                .await
                {
                    Ok(image) => {
                        comparison_image = image.map(|img| ComparisonImage {
                            data: img.data,
                            mime_type: img.mime_type,
                        })
                    }
                    Err(e) => return error_response(&e, Some(analysis)),
                }
            }
            None => warn!("Comparison image requested but no image generator is configured"),
        }
    }

    (
        StatusCode::OK,
        Json(AnalyzeResponse {
            success: true,
            analysis: Some(analysis),
            comparison_image,
            error: None,
            error_kind: None,
        }),
    )
        .into_response()
}
