use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::analysis::config::AnalysisConfig;
use crate::analysis::tokenizer::{extract_tokens, TokenRules};
use crate::db::models::{Category, Reading};

/// Which readings feed pattern detection: the most recent `max_readings`
/// abnormal readings taken within `lookback` of the analysis time.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisWindow {
    pub lookback: Duration,
    pub max_readings: usize,
}

impl AnalysisWindow {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            lookback: config.lookback(),
            max_readings: config.max_recent_readings,
        }
    }

    /// Start of the window. Saturates at the earliest representable instant.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn select<'a>(&self, readings: &'a [Reading], now: DateTime<Utc>) -> Vec<&'a Reading> {
        let since = self.since(now);
        let mut selected: Vec<&Reading> = readings
            .iter()
            .filter(|r| r.category == Category::Abnormal && r.timestamp >= since)
            .collect();
        selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        selected.truncate(self.max_readings);
        selected
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerCount {
    pub token: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternAnalysis {
    /// Every token seen, in first-seen order.
    pub frequencies: Vec<TriggerCount>,
    /// Tokens whose count reached the repetition threshold, in first-seen order.
    pub patterns: Vec<String>,
}

/// Count token occurrences across readings, preserving first-seen order.
pub fn count_triggers<'a, I>(readings: I, rules: &TokenRules) -> Vec<TriggerCount>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<TriggerCount> = Vec::new();

    for reading in readings {
        for token in extract_tokens(reading, rules) {
            match index.get(&token) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    index.insert(token.clone(), counts.len());
                    counts.push(TriggerCount { token, count: 1 });
                }
            }
        }
    }

    counts
}

pub fn find_patterns<'a, I>(readings: I, rules: &TokenRules, repetition_threshold: usize) -> PatternAnalysis
where
    I: IntoIterator<Item = &'a Reading>,
{
    let frequencies = count_triggers(readings, rules);
    let patterns = frequencies
        .iter()
        .filter(|entry| entry.count >= repetition_threshold)
        .map(|entry| entry.token.clone())
        .collect();

    PatternAnalysis {
        frequencies,
        patterns,
    }
}

/// Highest counts first; equal counts keep first-seen order (stable sort).
pub fn top_triggers(frequencies: &[TriggerCount], k: usize) -> Vec<TriggerCount> {
    let mut ranked = frequencies.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(k);
    ranked
}
