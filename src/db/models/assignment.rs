use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Links a patient to a specialist who follows their alerts. One row per pair;
/// re-assigning refreshes `assigned_by` and `assigned_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientAssignment {
    pub patient_id: String,
    pub specialist_id: String,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
}
