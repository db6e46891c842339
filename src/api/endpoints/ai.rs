use axum::extract::State;
use axum::Json;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::{AnalyzeRequest, AnalyzeResponse, ApiContext};

/// `POST /api/ai/analyze`: run pattern detection for one patient now.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let outcome = ctx.engine.analyze_patient(&request.patient_id).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        tier: outcome.tier,
        patterns_found: outcome.patterns_found,
        new_recommendations: outcome.new_recommendations,
    }))
}
