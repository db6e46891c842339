//! Storage seams consumed by the analysis engine and the report aggregator.
//!
//! [`crate::db::Database`] implements every trait on SQLite; tests use
//! the in-memory doubles in [`testing`].

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{Category, PatientAssignment, Reading, Recommendation, ThresholdConfig};

/// Filter for reading lookups. Every bound is inclusive; results come back
/// newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingQuery {
    pub patient_id: Option<String>,
    pub category: Option<Category>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl ReadingQuery {
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            ..Self::default()
        }
    }

    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
            ..Self::default()
        }
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        self.patient_id
            .as_deref()
            .map_or(true, |id| reading.patient_id == id)
            && self.category.map_or(true, |c| reading.category == c)
            && self.since.map_or(true, |t| reading.timestamp >= t)
            && self.until.map_or(true, |t| reading.timestamp <= t)
    }
}

/// Result of inserting an AI recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The store's uniqueness constraint rejected the row.
    Duplicate,
}

#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn query_readings(&self, query: ReadingQuery) -> Result<Vec<Reading>>;
    async fn count_readings(&self, query: ReadingQuery) -> Result<usize>;
    async fn insert_reading(&self, reading: Reading) -> Result<()>;
}

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Recommendations for `patient_id` whose advice equals `advice` exactly,
    /// created at or after `since`.
    async fn find_matching(
        &self,
        patient_id: &str,
        advice: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Recommendation>>;
    async fn insert_recommendation(&self, recommendation: Recommendation)
        -> Result<InsertOutcome>;
    async fn recommendations_for_patient(&self, patient_id: &str) -> Result<Vec<Recommendation>>;
}

#[async_trait]
pub trait ThresholdStore: Send + Sync {
    async fn get_all_thresholds(&self) -> Result<Vec<ThresholdConfig>>;
    async fn upsert_threshold(&self, threshold: ThresholdConfig) -> Result<ThresholdConfig>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn specialists_for(&self, patient_id: &str) -> Result<Vec<String>>;
    /// Patient ids assigned to `specialist_id`, sorted.
    async fn patients_for(&self, specialist_id: &str) -> Result<Vec<String>>;
    async fn upsert_assignment(&self, assignment: PatientAssignment) -> Result<PatientAssignment>;
}

/// The collaborators bundled for injection at construction time.
#[derive(Clone)]
pub struct Stores {
    pub readings: Arc<dyn ReadingStore>,
    pub recommendations: Arc<dyn RecommendationStore>,
    pub thresholds: Arc<dyn ThresholdStore>,
    pub assignments: Arc<dyn AssignmentStore>,
}

impl Stores {
    /// Use one backend for every collaborator.
    pub fn shared<S>(backend: S) -> Self
    where
        S: ReadingStore + RecommendationStore + ThresholdStore + AssignmentStore + 'static,
    {
        Self::shared_arc(Arc::new(backend))
    }

    pub fn shared_arc<S>(backend: Arc<S>) -> Self
    where
        S: ReadingStore + RecommendationStore + ThresholdStore + AssignmentStore + 'static,
    {
        Self {
            readings: backend.clone(),
            recommendations: backend.clone(),
            thresholds: backend.clone(),
            assignments: backend,
        }
    }
}
