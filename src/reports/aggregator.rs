use std::{collections::HashSet, sync::Arc};

use serde::Serialize;

use crate::analysis::config::AnalysisConfig;
use crate::analysis::frequency::{count_triggers, top_triggers};
use crate::analysis::tokenizer::TokenRules;
use crate::db::models::{Category, Reading};
use crate::reports::{period::ReportPeriod, ReportError};
use crate::stores::{ReadingQuery, ReadingStore};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const NO_TRIGGERS: &str = "None detected";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportSummary {
    pub period: String,
    pub total_readings: usize,
    pub total_active_patients: usize,
    pub avg_sugar_level: f64,
    pub highest_reading: f64,
    pub lowest_reading: f64,
    pub abnormal_count: usize,
    pub top_triggers: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Summary(ReportSummary),
    NoData,
}

/// Compute period statistics. `None` when there are no readings, so callers
/// never see an average over an empty set.
pub fn summarize(
    readings: &[Reading],
    label: &str,
    rules: &TokenRules,
    top_k: usize,
) -> Option<ReportSummary> {
    if readings.is_empty() {
        return None;
    }

    let total = readings.len();
    let patients: HashSet<&str> = readings.iter().map(|r| r.patient_id.as_str()).collect();
    let sum: f64 = readings.iter().map(|r| r.value).sum();
    let highest = readings.iter().map(|r| r.value).fold(f64::MIN, f64::max);
    let lowest = readings.iter().map(|r| r.value).fold(f64::MAX, f64::min);

    let abnormal: Vec<&Reading> = readings
        .iter()
        .filter(|r| r.category == Category::Abnormal)
        .collect();
    let triggers = top_triggers(&count_triggers(abnormal.iter().copied(), rules), top_k);
    let top_triggers = if triggers.is_empty() {
        NO_TRIGGERS.to_string()
    } else {
        triggers
            .iter()
            .map(|t| format!("{} ({})", t.token, t.count))
            .collect::<Vec<_>>()
            .join(", ")
    };

    Some(ReportSummary {
        period: label.to_string(),
        total_readings: total,
        total_active_patients: patients.len(),
        avg_sugar_level: round_one_decimal(sum / total as f64),
        highest_reading: highest,
        lowest_reading: lowest,
        abnormal_count: abnormal.len(),
        top_triggers,
    })
}

/// Half-up for the non-negative values readings carry.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Clone)]
pub struct ReportAggregator {
    readings: Arc<dyn ReadingStore>,
    rules: Arc<TokenRules>,
    top_k: usize,
}

impl ReportAggregator {
    pub fn new(readings: Arc<dyn ReadingStore>, config: &AnalysisConfig) -> Self {
        Self {
            readings,
            rules: Arc::new(TokenRules::from_config(config)),
            top_k: config.top_k_triggers,
        }
    }

    pub async fn generate_report(&self, period: &ReportPeriod) -> Result<ReportOutcome, ReportError> {
        let mut readings = self
            .readings
            .query_readings(ReadingQuery::between(period.start, period.end))
            .await
            .map_err(|err| {
                log_warn!("Report {} could not load readings: {err:#}", period.label);
                ReportError::StoreUnavailable(err)
            })?;
        readings.retain(|r| period.contains(r.timestamp));

        match summarize(&readings, &period.label, &self.rules, self.top_k) {
            Some(summary) => {
                log_info!(
                    "Report {}: {} readings from {} patients",
                    summary.period,
                    summary.total_readings,
                    summary.total_active_patients
                );
                Ok(ReportOutcome::Summary(summary))
            }
            None => {
                log_info!("Report {}: no data", period.label);
                Ok(ReportOutcome::NoData)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::stores::testing::{FailingStore, MemoryStore};

    fn reading(patient: &str, value: f64, category: Category, food: &str, day: u32) -> Reading {
        Reading {
            id: format!("{patient}-{day}-{value}"),
            patient_id: patient.into(),
            value,
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 8, 30, 0).unwrap(),
            category,
            food_intake: Some(food.into()),
            activity: None,
            notes: None,
        }
    }

    fn rules() -> TokenRules {
        TokenRules::from_config(&AnalysisConfig::default())
    }

    #[test]
    fn january_scenario_statistics() {
        let readings = vec![
            reading("p1", 100.0, Category::Normal, "salad", 3),
            reading("p1", 200.0, Category::Abnormal, "cake, soda", 10),
            reading("p2", 50.0, Category::Abnormal, "cake", 20),
        ];

        let summary = summarize(&readings, "2024-01", &rules(), 3).unwrap();
        assert_eq!(summary.total_readings, 3);
        assert_eq!(summary.total_active_patients, 2);
        assert_eq!(summary.avg_sugar_level, 116.7);
        assert_eq!(summary.highest_reading, 200.0);
        assert_eq!(summary.lowest_reading, 50.0);
        assert_eq!(summary.abnormal_count, 2);
        assert_eq!(summary.top_triggers, "cake (2), soda (1)");
    }

    #[test]
    fn no_abnormal_readings_means_no_triggers() {
        let readings = vec![reading("p1", 100.0, Category::Normal, "salad", 3)];
        let summary = summarize(&readings, "2024-01", &rules(), 3).unwrap();
        assert_eq!(summary.top_triggers, NO_TRIGGERS);
        assert!(summary.avg_sugar_level.is_finite());
    }

    #[test]
    fn empty_input_has_no_summary() {
        assert!(summarize(&[], "2024-01", &rules(), 3).is_none());
    }

    #[tokio::test]
    async fn generate_report_uses_period_bounds() {
        let store = Arc::new(MemoryStore::default());
        {
            let mut rows = store.readings.lock().unwrap();
            rows.push(reading("p1", 100.0, Category::Normal, "salad", 31));
            let mut february = reading("p1", 300.0, Category::Abnormal, "cake", 1);
            february.timestamp = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
            rows.push(february);
        }
        let aggregator = ReportAggregator::new(store, &AnalysisConfig::default());

        let january = ReportPeriod::from_request(2024, Some(1)).unwrap();
        match aggregator.generate_report(&january).await.unwrap() {
            ReportOutcome::Summary(summary) => {
                assert_eq!(summary.total_readings, 1);
                assert_eq!(summary.highest_reading, 100.0);
            }
            ReportOutcome::NoData => panic!("expected a summary"),
        }

        let march = ReportPeriod::from_request(2024, Some(3)).unwrap();
        assert_eq!(aggregator.generate_report(&march).await.unwrap(), ReportOutcome::NoData);
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let aggregator = ReportAggregator::new(Arc::new(FailingStore), &AnalysisConfig::default());
        let period = ReportPeriod::from_request(2024, None).unwrap();
        assert!(matches!(
            aggregator.generate_report(&period).await,
            Err(ReportError::StoreUnavailable(_))
        ));
    }
}
