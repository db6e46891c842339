//! Category threshold rows, one per category, maintained by clinic staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    pub category: Category,
    pub min_value: f64,
    pub max_value: f64,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ThresholdConfig {
    /// Inclusive on both bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_value && value <= self.max_value
    }
}

/// Validation for staff-supplied threshold updates
pub mod validation {
    use anyhow::{bail, Result};

    pub fn validate_range(min: f64, max: f64) -> Result<()> {
        if !min.is_finite() || !max.is_finite() {
            bail!("Threshold bounds must be finite numbers");
        }
        if min < 0.0 {
            bail!("Threshold minimum cannot be negative");
        }
        if min > max {
            bail!("Threshold minimum ({min}) is greater than maximum ({max})");
        }
        Ok(())
    }
}
