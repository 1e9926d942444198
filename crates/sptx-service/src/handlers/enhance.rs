//! Event description enhancement handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::required;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::genai::{enhance_prompt, EnhanceInput};
use crate::state::AppState;

/// Request to rewrite an event description.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    /// Event name.
    pub event_name: Option<String>,
    /// Draft description.
    pub event_description: Option<String>,
    /// Kind of event.
    pub event_type: Option<String>,
    /// Desired tone.
    pub tone: Option<String>,
}

/// Rewritten description.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    /// Always `true`.
    pub success: bool,
    /// The rewritten description.
    pub enhanced_description: String,
}

/// POST /enhance
pub async fn enhance_description(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, ApiError> {
    let event_name = required(request.event_name, "eventName")?;
    let description = required(request.event_description, "eventDescription")?;

    let genai = state
        .genai
        .as_ref()
        .ok_or(ApiError::Configuration("Generative text API"))?;

    let prompt = enhance_prompt(&EnhanceInput {
        event_name: &event_name,
        description: &description,
        event_type: request.event_type.as_deref(),
        tone: request.tone.as_deref(),
    });

    let enhanced_description = genai
        .generate(&prompt)
        .await
        .map_err(|e| ApiError::external("genai", e))?;

    Ok(Json(EnhanceResponse {
        success: true,
        enhanced_description,
    }))
}
