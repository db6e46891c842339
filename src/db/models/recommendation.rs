use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecommendationSource {
    #[serde(rename = "AI")]
    Ai,
    Specialist,
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationSource::Ai => "AI",
            RecommendationSource::Specialist => "Specialist",
        }
    }
}

/// Advice issued to a patient. Never mutated once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub patient_id: String,
    pub advice: String,
    pub source: RecommendationSource,
    pub created_at: DateTime<Utc>,
}
