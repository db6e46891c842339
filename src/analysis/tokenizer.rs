use std::collections::HashSet;

use crate::analysis::config::AnalysisConfig;
use crate::db::models::Reading;

/// Normalisation rules applied to free-text food and activity entries.
#[derive(Debug, Clone)]
pub struct TokenRules {
    pub min_length: usize,
    pub stopwords: HashSet<String>,
}

impl TokenRules {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            min_length: config.min_token_length,
            stopwords: config.stopwords.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    fn accepts(&self, token: &str) -> bool {
        token.chars().count() >= self.min_length && !self.stopwords.contains(token)
    }
}

/// Candidate trigger tokens for one reading, in text order.
///
/// Repeated words are kept so that frequency counts stay additive.
pub fn extract_tokens(reading: &Reading, rules: &TokenRules) -> Vec<String> {
    let text = format!(
        "{} {}",
        reading.food_intake.as_deref().unwrap_or_default(),
        reading.activity.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty() && rules.accepts(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::models::Category;

    fn reading(food: Option<&str>, activity: Option<&str>) -> Reading {
        Reading {
            id: "r".into(),
            patient_id: "p".into(),
            value: 150.0,
            timestamp: Utc::now(),
            category: Category::Abnormal,
            food_intake: food.map(String::from),
            activity: activity.map(String::from),
            notes: Some("ignored notes text".into()),
        }
    }

    fn rules() -> TokenRules {
        TokenRules::from_config(&AnalysisConfig::default())
    }

    #[test]
    fn splits_on_commas_and_whitespace_and_lowercases() {
        let tokens = extract_tokens(&reading(Some("Pizza, Soda"), Some("Long  WALK")), &rules());
        assert_eq!(tokens, vec!["pizza", "soda", "long", "walk"]);
    }

    #[test]
    fn drops_short_tokens_and_stopwords() {
        let tokens = extract_tokens(&reading(Some("rice with an egg"), Some("run after tea")), &rules());
        assert_eq!(tokens, vec!["rice", "egg", "run", "tea"]);
    }

    #[test]
    fn keeps_duplicates_within_one_entry() {
        let tokens = extract_tokens(&reading(Some("cake, cake"), Some("cake")), &rules());
        assert_eq!(tokens, vec!["cake", "cake", "cake"]);
    }

    #[test]
    fn missing_fields_yield_no_tokens() {
        assert!(extract_tokens(&reading(None, None), &rules()).is_empty());
        assert_eq!(extract_tokens(&reading(None, Some("swim")), &rules()), vec!["swim"]);
    }

    #[test]
    fn longer_minimum_is_configurable() {
        let config = AnalysisConfig {
            min_token_length: 4,
            ..AnalysisConfig::default()
        };
        let tokens = extract_tokens(&reading(Some("tea, toast"), None), &TokenRules::from_config(&config));
        assert_eq!(tokens, vec!["toast"]);
    }
}
