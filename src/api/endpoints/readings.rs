use axum::extract::State;
use axum::Json;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::{ApiContext, CreateReadingRequest, ReadingResponse};
use crate::db::models::NewReading;

/// `POST /api/readings`: classify and store a reading, then analyse the
/// patient in the background. The response never waits on the analysis.
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<CreateReadingRequest>,
) -> Result<Json<ReadingResponse>, ApiError> {
    let reading = ctx
        .engine
        .record_reading(NewReading {
            patient_id: request.patient_id,
            value: request.value,
            measured_at: request.measured_at,
            food_intake: request.food_intake,
            activity: request.activity,
            notes: request.notes,
        })
        .await?;

    ctx.engine.spawn_analysis(reading.patient_id.clone());

    Ok(Json(ReadingResponse {
        success: true,
        reading,
    }))
}
