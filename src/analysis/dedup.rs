use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::models::{Recommendation, RecommendationSource};
use crate::stores::{InsertOutcome, RecommendationStore};
use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub inserted: bool,
    pub record: Option<Recommendation>,
}

impl GateOutcome {
    fn skipped() -> Self {
        Self {
            inserted: false,
            record: None,
        }
    }
}

/// Writes AI advice at most once per (patient, exact advice text) within the
/// dedup window. Check and insert run inside a per-patient critical section;
/// a uniqueness conflict reported by the store is treated as "already issued".
#[derive(Clone)]
pub struct DedupGate {
    store: Arc<dyn RecommendationStore>,
    window: Duration,
    locks: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl DedupGate {
    pub fn new(store: Arc<dyn RecommendationStore>, window: Duration) -> Self {
        Self {
            store,
            window,
            locks: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    pub async fn persist_if_new(&self, patient_id: &str, advice: &str) -> Result<GateOutcome> {
        self.persist_if_new_at(patient_id, advice, Utc::now()).await
    }

    pub async fn persist_if_new_at(
        &self,
        patient_id: &str,
        advice: &str,
        now: DateTime<Utc>,
    ) -> Result<GateOutcome> {
        let lock = self.patient_lock(patient_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.check_and_insert(patient_id, advice, now).await
        };
        drop(lock);
        self.prune_idle_locks();
        outcome
    }

    async fn check_and_insert(
        &self,
        patient_id: &str,
        advice: &str,
        now: DateTime<Utc>,
    ) -> Result<GateOutcome> {
        let since = now
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let existing = self.store.find_matching(patient_id, advice, since).await?;
        if !existing.is_empty() {
            log_debug!("Suppressing repeated advice for patient {patient_id}: {advice}");
            return Ok(GateOutcome::skipped());
        }

        let record = Recommendation {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            advice: advice.to_string(),
            source: RecommendationSource::Ai,
            created_at: now,
        };

        match self.store.insert_recommendation(record.clone()).await? {
            InsertOutcome::Inserted => Ok(GateOutcome {
                inserted: true,
                record: Some(record),
            }),
            InsertOutcome::Duplicate => {
                log_info!("Uniqueness conflict for patient {patient_id}; advice already stored");
                Ok(GateOutcome::skipped())
            }
        }
    }

    fn patient_lock(&self, patient_id: &str) -> Arc<Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(patient_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn prune_idle_locks(&self) {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::stores::testing::{FailingStore, MemoryStore};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn second_identical_advice_is_suppressed() {
        let store = Arc::new(MemoryStore::default());
        let gate = DedupGate::new(store.clone(), Duration::hours(24));

        let first = gate.persist_if_new_at("p1", "Eat less", noon()).await.unwrap();
        let second = gate
            .persist_if_new_at("p1", "Eat less", noon() + Duration::minutes(1))
            .await
            .unwrap();

        assert!(first.inserted);
        assert_eq!(first.record.as_ref().map(|r| r.source), Some(RecommendationSource::Ai));
        assert!(!second.inserted);
        assert!(second.record.is_none());
        assert_eq!(store.recommendations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn advice_outside_window_is_issued_again() {
        let store = Arc::new(MemoryStore::default());
        let gate = DedupGate::new(store.clone(), Duration::hours(24));

        gate.persist_if_new_at("p1", "Eat less", noon()).await.unwrap();
        let later = gate
            .persist_if_new_at("p1", "Eat less", noon() + Duration::hours(25))
            .await
            .unwrap();

        assert!(later.inserted);
        assert_eq!(store.recommendations.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_patients_and_other_text_are_independent() {
        let store = Arc::new(MemoryStore::default());
        let gate = DedupGate::new(store.clone(), Duration::hours(24));

        assert!(gate.persist_if_new_at("p1", "Eat less", noon()).await.unwrap().inserted);
        assert!(gate.persist_if_new_at("p2", "Eat less", noon()).await.unwrap().inserted);
        assert!(gate.persist_if_new_at("p1", "Eat less.", noon()).await.unwrap().inserted);
    }

    #[tokio::test]
    async fn store_level_conflict_is_a_silent_noop() {
        let store = Arc::new(MemoryStore::default());
        // Narrow window lets the lookup miss while the day bucket still clashes.
        let gate = DedupGate::new(store.clone(), Duration::minutes(5));

        gate.persist_if_new_at("p1", "Eat less", noon()).await.unwrap();
        let clash = gate
            .persist_if_new_at("p1", "Eat less", noon() + Duration::hours(1))
            .await
            .unwrap();

        assert!(!clash.inserted);
        assert_eq!(store.recommendations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_calls_insert_once() {
        let store = Arc::new(MemoryStore::default());
        let gate = DedupGate::new(store.clone(), Duration::hours(24));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move { gate.persist_if_new("p1", "Eat less").await.unwrap() })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap().inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert!(gate.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn huge_window_covers_all_history() {
        let store = Arc::new(MemoryStore::default());
        let gate = DedupGate::new(store.clone(), Duration::hours(i64::from(u32::MAX)));

        assert!(gate.persist_if_new_at("p1", "Eat less", noon()).await.unwrap().inserted);
        let years_later = gate
            .persist_if_new_at("p1", "Eat less", noon() + Duration::days(3650))
            .await
            .unwrap();
        assert!(!years_later.inserted);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let gate = DedupGate::new(Arc::new(FailingStore), Duration::hours(24));
        assert!(gate.persist_if_new("p1", "Eat less").await.is_err());
    }
}
