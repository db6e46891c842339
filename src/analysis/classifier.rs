//! Maps a glucose value to a [`Category`] using the threshold table.
//!
//! Precedence is fixed: the Normal range is checked first, then the optional
//! Borderline range, and anything else is Abnormal. Both bounds of a range are
//! inclusive, so a boundary value shared by Normal and Borderline is Normal.

use crate::db::models::{Category, ThresholdConfig};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    #[error("glucose value must be a finite, non-negative number (got {0})")]
    InvalidValue(f64),
    #[error("threshold table has no Normal range")]
    MissingNormalRange,
}

pub fn classify(value: f64, thresholds: &[ThresholdConfig]) -> Result<Category, ClassifyError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ClassifyError::InvalidValue(value));
    }

    let normal = find_range(thresholds, Category::Normal).ok_or(ClassifyError::MissingNormalRange)?;
    if normal.contains(value) {
        return Ok(Category::Normal);
    }

    if find_range(thresholds, Category::Borderline).map_or(false, |band| band.contains(value)) {
        return Ok(Category::Borderline);
    }

    Ok(Category::Abnormal)
}

fn find_range(thresholds: &[ThresholdConfig], category: Category) -> Option<&ThresholdConfig> {
    thresholds.iter().find(|t| t.category == category)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn range(category: Category, min: f64, max: f64) -> ThresholdConfig {
        ThresholdConfig {
            category,
            min_value: min,
            max_value: max,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    fn normal_only() -> Vec<ThresholdConfig> {
        vec![range(Category::Normal, 70.0, 130.0)]
    }

    #[test]
    fn normal_bounds_are_inclusive() {
        let table = normal_only();
        assert_eq!(classify(70.0, &table), Ok(Category::Normal));
        assert_eq!(classify(130.0, &table), Ok(Category::Normal));
        assert_eq!(classify(100.0, &table), Ok(Category::Normal));
    }

    #[test]
    fn outside_normal_without_borderline_is_abnormal() {
        let table = normal_only();
        assert_eq!(classify(69.0, &table), Ok(Category::Abnormal));
        assert_eq!(classify(131.0, &table), Ok(Category::Abnormal));
        assert_eq!(classify(0.0, &table), Ok(Category::Abnormal));
    }

    #[test]
    fn borderline_band_is_checked_after_normal() {
        let mut table = normal_only();
        table.push(range(Category::Borderline, 130.0, 180.0));

        assert_eq!(classify(130.0, &table), Ok(Category::Normal));
        assert_eq!(classify(131.0, &table), Ok(Category::Borderline));
        assert_eq!(classify(180.0, &table), Ok(Category::Borderline));
        assert_eq!(classify(181.0, &table), Ok(Category::Abnormal));
        assert_eq!(classify(69.0, &table), Ok(Category::Abnormal));
    }

    #[test]
    fn abnormal_rows_in_the_table_are_ignored() {
        let mut table = normal_only();
        table.insert(0, range(Category::Abnormal, 0.0, 200.0));
        assert_eq!(classify(100.0, &table), Ok(Category::Normal));
        assert_eq!(classify(150.0, &table), Ok(Category::Abnormal));
    }

    #[test]
    fn same_inputs_classify_identically() {
        let table = normal_only();
        for value in [0.0, 69.9, 70.0, 129.99, 130.0, 130.01, 400.0] {
            assert_eq!(classify(value, &table), classify(value, &table));
        }
    }

    #[test]
    fn invalid_values_are_flagged_not_panicking() {
        let table = normal_only();
        assert!(matches!(classify(f64::NAN, &table), Err(ClassifyError::InvalidValue(_))));
        assert!(matches!(classify(f64::INFINITY, &table), Err(ClassifyError::InvalidValue(_))));
        assert_eq!(classify(-5.0, &table), Err(ClassifyError::InvalidValue(-5.0)));
    }

    #[test]
    fn missing_normal_range_is_reported() {
        let table = vec![range(Category::Borderline, 130.0, 180.0)];
        assert_eq!(classify(100.0, &table), Err(ClassifyError::MissingNormalRange));
    }
}
