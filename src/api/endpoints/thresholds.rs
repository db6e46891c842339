use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::{ApiContext, ThresholdListResponse, ThresholdResponse, UpdateThresholdRequest};
use crate::db::models::{threshold::validation::validate_range, Category, ThresholdConfig};
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// `GET /api/staff/thresholds`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<ThresholdListResponse>, ApiError> {
    let data = ctx
        .stores
        .thresholds
        .get_all_thresholds()
        .await
        .map_err(|err| ApiError::ServiceUnavailable(format!("{err:#}")))?;
    Ok(Json(ThresholdListResponse { success: true, data }))
}

/// `POST /api/staff/thresholds/update`: replaces one category's range.
/// Stored readings keep the category they were given at write time.
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<UpdateThresholdRequest>,
) -> Result<Json<ThresholdResponse>, ApiError> {
    let category = Category::from_name(&request.category)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown category '{}'", request.category)))?;
    validate_range(request.min, request.max).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    if request.staff_id.trim().is_empty() {
        return Err(ApiError::BadRequest("staffId is required".into()));
    }

    let data = ctx
        .stores
        .thresholds
        .upsert_threshold(ThresholdConfig {
            category,
            min_value: request.min,
            max_value: request.max,
            updated_by: Some(request.staff_id.trim().to_string()),
            updated_at: Utc::now(),
        })
        .await
        .map_err(|err| ApiError::ServiceUnavailable(format!("{err:#}")))?;

    log_info!(
        "Threshold {} set to [{}, {}] by {}",
        data.category.as_str(),
        data.min_value,
        data.max_value,
        request.staff_id
    );
    Ok(Json(ThresholdResponse { success: true, data }))
}
