use axum::extract::State;
use axum::Json;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::{ApiContext, ReportRequest, ReportResponse};
use crate::reports::{ReportOutcome, ReportPeriod};

pub const NO_DATA_MESSAGE: &str = "No data found";

/// `POST /api/reports/generate`: statistics for a month or a whole year.
pub async fn generate(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let period = ReportPeriod::from_request(request.year, request.month)?;

    let response = match ctx.reports.generate_report(&period).await? {
        ReportOutcome::Summary(report) => ReportResponse::Report {
            success: true,
            report,
        },
        ReportOutcome::NoData => ReportResponse::NoData {
            success: true,
            message: NO_DATA_MESSAGE,
        },
    };
    Ok(Json(response))
}
