use anyhow::{bail, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// One century of history.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;
pub const MAX_DEDUP_WINDOW_HOURS: u32 = 876_000;

/// Tunable policy for pattern detection, deduplication and reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A token must appear in at least this many abnormal readings to count as a pattern
    pub repetition_threshold: usize,

    /// Only readings from the last `lookback_days` days are analysed
    pub lookback_days: u32,

    /// Cap on the number of most recent abnormal readings considered
    pub max_recent_readings: usize,

    /// Tokens shorter than this many characters are discarded
    pub min_token_length: usize,

    /// Identical advice is not re-issued to a patient within this window
    pub dedup_window_hours: u32,

    /// Number of triggers listed in period reports
    pub top_k_triggers: usize,

    pub stopwords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            repetition_threshold: 3,
            lookback_days: 30,
            max_recent_readings: 50,
            min_token_length: 3,
            dedup_window_hours: 24,
            top_k_triggers: 3,
            stopwords: ["with", "after", "before", "some", "and", "the", "for"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repetition_threshold == 0 {
            bail!("repetition_threshold must be at least 1");
        }
        if self.lookback_days == 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            bail!("lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}");
        }
        if self.max_recent_readings == 0 {
            bail!("max_recent_readings must be at least 1");
        }
        if self.dedup_window_hours == 0 || self.dedup_window_hours > MAX_DEDUP_WINDOW_HOURS {
            bail!("dedup_window_hours must be between 1 and {MAX_DEDUP_WINDOW_HOURS}");
        }
        if self.top_k_triggers == 0 {
            bail!("top_k_triggers must be at least 1");
        }
        Ok(())
    }

    pub fn lookback(&self) -> Duration {
        Duration::days(i64::from(self.lookback_days))
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::hours(i64::from(self.dedup_window_hours))
    }
}
