use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::{
    ApiContext, RecommendationListResponse, RecommendationQuery, RecommendationResponse,
    SpecialistAdviceRequest,
};
use crate::db::models::{Recommendation, RecommendationSource};
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// `POST /api/recommendations`: specialist advice. Stored as written; the
/// AI dedup gate does not apply.
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<SpecialistAdviceRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let patient_id = request.patient_id.trim();
    let advice = request.advice.trim();
    if patient_id.is_empty() {
        return Err(ApiError::BadRequest("patientId is required".into()));
    }
    if request.specialist_id.trim().is_empty() {
        return Err(ApiError::BadRequest("specialistId is required".into()));
    }
    if advice.is_empty() {
        return Err(ApiError::BadRequest("advice is required".into()));
    }

    let record = Recommendation {
        id: Uuid::new_v4().to_string(),
        patient_id: patient_id.to_string(),
        advice: advice.to_string(),
        source: RecommendationSource::Specialist,
        created_at: Utc::now(),
    };
    ctx.stores
        .recommendations
        .insert_recommendation(record.clone())
        .await
        .map_err(|err| ApiError::ServiceUnavailable(format!("{err:#}")))?;

    log_info!(
        "Specialist {} added advice for patient {}",
        request.specialist_id.trim(),
        record.patient_id
    );
    Ok(Json(RecommendationResponse {
        success: true,
        data: record,
    }))
}

/// `GET /api/recommendations?patientId=`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationListResponse>, ApiError> {
    let patient_id = query.patient_id.trim();
    if patient_id.is_empty() {
        return Err(ApiError::BadRequest("patientId is required".into()));
    }

    let data = ctx
        .stores
        .recommendations
        .recommendations_for_patient(patient_id)
        .await
        .map_err(|err| ApiError::ServiceUnavailable(format!("{err:#}")))?;
    Ok(Json(RecommendationListResponse { success: true, data }))
}
