//! Turns detected patterns into advice text.
//!
//! Exactly one tier applies per analysis, checked in declaration order of
//! [`AdviceTier`]. Advice text is a pure function of the inputs so the dedup
//! gate can compare it byte for byte.

use serde::Serialize;

pub const ONBOARDING_ADVICE: &str =
    "Welcome! Log your first reading to start receiving AI insights.";

pub const STABILIZATION_ADVICE: &str = "Some of your recent readings were outside the normal range. \
Keep logging meals and activities so recurring triggers can be identified, and aim for regular, balanced meals.";

pub const ON_TRACK_ADVICE: &str =
    "Great work! All of your recent readings are within the normal range. Keep up your current routine.";

pub fn pattern_advice(token: &str) -> String {
    format!("Recurring spike detected after '{token}'. Consider adjusting intake.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdviceTier {
    Onboarding,
    Patterns,
    Stabilize,
    OnTrack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub tier: AdviceTier,
    pub advice: Vec<String>,
}

pub fn synthesize(patterns: &[String], abnormal_count: usize, total_count: usize) -> Synthesis {
    if total_count == 0 {
        return Synthesis {
            tier: AdviceTier::Onboarding,
            advice: vec![ONBOARDING_ADVICE.to_string()],
        };
    }

    if !patterns.is_empty() {
        return Synthesis {
            tier: AdviceTier::Patterns,
            advice: patterns.iter().map(|token| pattern_advice(token)).collect(),
        };
    }

    if abnormal_count > 0 {
        return Synthesis {
            tier: AdviceTier::Stabilize,
            advice: vec![STABILIZATION_ADVICE.to_string()],
        };
    }

    Synthesis {
        tier: AdviceTier::OnTrack,
        advice: vec![ON_TRACK_ADVICE.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_readings_gets_only_onboarding() {
        let result = synthesize(&[], 0, 0);
        assert_eq!(result.tier, AdviceTier::Onboarding);
        assert_eq!(result.advice, vec![ONBOARDING_ADVICE]);
    }

    #[test]
    fn one_message_per_pattern_in_order() {
        let patterns = vec!["pizza".to_string(), "soda".to_string()];
        let result = synthesize(&patterns, 5, 9);
        assert_eq!(result.tier, AdviceTier::Patterns);
        assert_eq!(
            result.advice,
            vec![
                "Recurring spike detected after 'pizza'. Consider adjusting intake.",
                "Recurring spike detected after 'soda'. Consider adjusting intake.",
            ]
        );
    }

    #[test]
    fn abnormal_without_pattern_gets_stabilization() {
        let result = synthesize(&[], 2, 10);
        assert_eq!(result.tier, AdviceTier::Stabilize);
        assert_eq!(result.advice, vec![STABILIZATION_ADVICE]);
    }

    #[test]
    fn all_normal_gets_only_positive_reinforcement() {
        let result = synthesize(&[], 0, 4);
        assert_eq!(result.tier, AdviceTier::OnTrack);
        assert_eq!(result.advice, vec![ON_TRACK_ADVICE]);
        assert!(!result.advice.iter().any(|a| a.contains("Recurring spike")));
    }

    #[test]
    fn onboarding_wins_even_if_patterns_are_passed() {
        let patterns = vec!["pizza".to_string()];
        assert_eq!(synthesize(&patterns, 3, 0).tier, AdviceTier::Onboarding);
    }
}
