use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::{
    classifier::{classify, ClassifyError},
    config::AnalysisConfig,
    dedup::DedupGate,
    frequency::{find_patterns, AnalysisWindow},
    synthesizer::{synthesize, AdviceTier},
    tokenizer::TokenRules,
};
use crate::db::models::{Category, NewReading, Reading};
use crate::stores::{ReadingQuery, Stores};
use crate::{log_error, log_info};

const ENABLE_LOGS: bool = true;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("threshold configuration is unusable: {0}")]
    Configuration(String),
    #[error("store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
}

impl From<ClassifyError> for EngineError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::InvalidValue(_) => EngineError::Validation(err.to_string()),
            ClassifyError::MissingNormalRange => EngineError::Configuration(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub patient_id: String,
    pub tier: AdviceTier,
    pub patterns_found: Vec<String>,
    pub new_recommendations: Vec<String>,
    pub abnormal_count: usize,
    pub total_count: usize,
}

/// Runs classification on ingest and the pattern/recommendation pipeline
/// per patient. Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct AnalysisEngine {
    stores: Stores,
    config: Arc<AnalysisConfig>,
    rules: Arc<TokenRules>,
    gate: DedupGate,
}

impl AnalysisEngine {
    pub fn new(stores: Stores, config: AnalysisConfig) -> Self {
        let gate = DedupGate::new(stores.recommendations.clone(), config.dedup_window());
        Self {
            rules: Arc::new(TokenRules::from_config(&config)),
            config: Arc::new(config),
            stores,
            gate,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub async fn analyze_patient(&self, patient_id: &str) -> Result<AnalysisOutcome, EngineError> {
        self.analyze_patient_at(patient_id, Utc::now()).await
    }

    pub async fn analyze_patient_at(
        &self,
        patient_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, EngineError> {
        let patient_id = require_patient_id(patient_id)?;
        let window = AnalysisWindow::from_config(&self.config);

        let total_count = self
            .stores
            .readings
            .count_readings(ReadingQuery::for_patient(patient_id))
            .await
            .map_err(EngineError::StoreUnavailable)?;

        let candidates = self
            .stores
            .readings
            .query_readings(ReadingQuery {
                category: Some(Category::Abnormal),
                since: Some(window.since(now)),
                limit: Some(window.max_readings),
                ..ReadingQuery::for_patient(patient_id)
            })
            .await
            .map_err(EngineError::StoreUnavailable)?;

        let recent_abnormal = window.select(&candidates, now);
        let analysis = find_patterns(
            recent_abnormal.iter().copied(),
            &self.rules,
            self.config.repetition_threshold,
        );
        let synthesis = synthesize(&analysis.patterns, recent_abnormal.len(), total_count);

        let mut new_recommendations = Vec::new();
        for advice in synthesis.advice {
            let outcome = self
                .gate
                .persist_if_new_at(patient_id, &advice, now)
                .await
                .map_err(EngineError::StoreUnavailable)?;
            if outcome.inserted {
                new_recommendations.push(advice);
            }
        }

        log_info!(
            "Analysed patient {patient_id}: {} abnormal of {total_count} readings, patterns {:?}, {} new recommendation(s)",
            recent_abnormal.len(),
            analysis.patterns,
            new_recommendations.len()
        );

        Ok(AnalysisOutcome {
            patient_id: patient_id.to_string(),
            tier: synthesis.tier,
            patterns_found: analysis.patterns,
            new_recommendations,
            abnormal_count: recent_abnormal.len(),
            total_count,
        })
    }

    /// Classify a reading against the thresholds currently in effect and store it.
    pub async fn record_reading(&self, input: NewReading) -> Result<Reading, EngineError> {
        let patient_id = require_patient_id(&input.patient_id)?.to_string();
        if !input.value.is_finite() || input.value < 0.0 {
            return Err(ClassifyError::InvalidValue(input.value).into());
        }

        let thresholds = self
            .stores
            .thresholds
            .get_all_thresholds()
            .await
            .map_err(EngineError::StoreUnavailable)?;
        let category = classify(input.value, &thresholds)?;

        let reading = Reading {
            id: Uuid::new_v4().to_string(),
            patient_id,
            value: input.value,
            timestamp: input.measured_at.unwrap_or_else(Utc::now),
            category,
            food_intake: non_blank(input.food_intake),
            activity: non_blank(input.activity),
            notes: non_blank(input.notes),
        };

        self.stores
            .readings
            .insert_reading(reading.clone())
            .await
            .map_err(EngineError::StoreUnavailable)?;

        Ok(reading)
    }

    /// Run the analysis in the background. Failures are logged and never
    /// reach the caller that stored the reading.
    pub fn spawn_analysis(&self, patient_id: String) -> tokio::task::JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            if let Err(err) = engine.analyze_patient(&patient_id).await {
                log_error!("Background analysis failed for patient {patient_id}: {err}");
            }
        })
    }
}

fn require_patient_id(patient_id: &str) -> Result<&str, EngineError> {
    let trimmed = patient_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("patientId is required".into()));
    }
    Ok(trimmed)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
