use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;

use crate::analysis::alerts::{alerts_for_specialist, assign_patient, DEFAULT_ALERT_LIMIT};
use crate::api::error::{ApiError, ApiJson};
use crate::api::types::{
    AlertQuery, ApiContext, AssignPatientRequest, AssignmentResponse, RecommendationListResponse,
};

/// `POST /api/staff/assign`: link a patient to a specialist.
pub async fn assign(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<AssignPatientRequest>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let data = assign_patient(
        &ctx.stores,
        &request.patient_id,
        &request.specialist_id,
        &request.staff_id,
        Utc::now(),
    )
    .await?;
    Ok(Json(AssignmentResponse { success: true, data }))
}

/// `GET /api/specialist/alerts?specialistId=`: AI advice for assigned patients.
pub async fn alerts(
    State(ctx): State<ApiContext>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<RecommendationListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_ALERT_LIMIT);
    let data = alerts_for_specialist(&ctx.stores, &query.specialist_id, limit).await?;
    Ok(Json(RecommendationListResponse { success: true, data }))
}

