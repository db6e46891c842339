//! Care-team plumbing: staff assign patients to specialists, and each
//! specialist reads the AI advice issued to the patients they follow.

use chrono::{DateTime, Utc};

use crate::analysis::engine::EngineError;
use crate::db::models::{PatientAssignment, Recommendation, RecommendationSource};
use crate::log_info;
use crate::stores::Stores;

const ENABLE_LOGS: bool = true;

pub const DEFAULT_ALERT_LIMIT: usize = 50;

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

pub async fn assign_patient(
    stores: &Stores,
    patient_id: &str,
    specialist_id: &str,
    staff_id: &str,
    now: DateTime<Utc>,
) -> Result<PatientAssignment, EngineError> {
    let assignment = PatientAssignment {
        patient_id: required(patient_id, "patientId")?.to_string(),
        specialist_id: required(specialist_id, "specialistId")?.to_string(),
        assigned_by: required(staff_id, "staffId")?.to_string(),
        assigned_at: now,
    };

    let stored = stores
        .assignments
        .upsert_assignment(assignment)
        .await
        .map_err(EngineError::StoreUnavailable)?;

    log_info!(
        "Patient {} assigned to specialist {} by {}",
        stored.patient_id,
        stored.specialist_id,
        stored.assigned_by
    );
    Ok(stored)
}

/// AI recommendations for every patient assigned to `specialist_id`,
/// newest first, at most `limit` entries.
pub async fn alerts_for_specialist(
    stores: &Stores,
    specialist_id: &str,
    limit: usize,
) -> Result<Vec<Recommendation>, EngineError> {
    let specialist_id = required(specialist_id, "specialistId")?;
    let patients = stores
        .assignments
        .patients_for(specialist_id)
        .await
        .map_err(EngineError::StoreUnavailable)?;

    let mut alerts = Vec::new();
    for patient_id in &patients {
        let issued = stores
            .recommendations
            .recommendations_for_patient(patient_id)
            .await
            .map_err(EngineError::StoreUnavailable)?;
        alerts.extend(
            issued
                .into_iter()
                .filter(|r| r.source == RecommendationSource::Ai),
        );
    }

    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    alerts.truncate(limit);
    Ok(alerts)
}
