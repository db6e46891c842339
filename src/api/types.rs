//! Shared state and wire contracts for the HTTP layer. Field names are
//! camelCase except the report body, which dashboards read in snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AdviceTier, AnalysisEngine};
use crate::db::models::{PatientAssignment, Reading, Recommendation, ThresholdConfig};
use crate::reports::{ReportAggregator, ReportSummary};
use crate::stores::Stores;

/// State handed to every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub engine: AnalysisEngine,
    pub reports: ReportAggregator,
    pub stores: Stores,
}

impl ApiContext {
    pub fn new(engine: AnalysisEngine) -> Self {
        let stores = engine.stores().clone();
        Self {
            reports: ReportAggregator::new(stores.readings.clone(), engine.config()),
            engine,
            stores,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub patient_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub tier: AdviceTier,
    pub patterns_found: Vec<String>,
    pub new_recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub year: i32,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportResponse {
    Report { success: bool, report: ReportSummary },
    NoData { success: bool, message: &'static str },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingRequest {
    pub patient_id: String,
    pub value: f64,
    pub measured_at: Option<DateTime<Utc>>,
    pub food_intake: Option<String>,
    pub activity: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub success: bool,
    pub reading: Reading,
}

#[derive(Debug, Serialize)]
pub struct ThresholdListResponse {
    pub success: bool,
    pub data: Vec<ThresholdConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThresholdRequest {
    pub category: String,
    pub min: f64,
    pub max: f64,
    pub staff_id: String,
}

#[derive(Debug, Serialize)]
pub struct ThresholdResponse {
    pub success: bool,
    pub data: ThresholdConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistAdviceRequest {
    pub patient_id: String,
    pub specialist_id: String,
    pub advice: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    pub patient_id: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub data: Recommendation,
}

#[derive(Debug, Serialize)]
pub struct RecommendationListResponse {
    pub success: bool,
    pub data: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPatientRequest {
    pub patient_id: String,
    pub specialist_id: String,
    pub staff_id: String,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub success: bool,
    pub data: PatientAssignment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub specialist_id: String,
    pub limit: Option<usize>,
}
