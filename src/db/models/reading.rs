//! Blood-glucose reading data model.
//!
//! A reading's `category` is derived by the classifier at write time and is
//! never reclassified when thresholds change later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Normal,
    Borderline,
    Abnormal,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::Borderline => "Borderline",
            Category::Abnormal => "Abnormal",
        }
    }

    /// Case-insensitive lookup used for threshold names coming from staff input.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Category::Normal),
            "borderline" => Some(Category::Borderline),
            "abnormal" => Some(Category::Abnormal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: String,
    pub patient_id: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub food_intake: Option<String>,
    pub activity: Option<String>,
    pub notes: Option<String>,
}

/// Patient-supplied fields of a reading before classification.
#[derive(Debug, Clone, Default)]
pub struct NewReading {
    pub patient_id: String,
    pub value: f64,
    pub measured_at: Option<DateTime<Utc>>,
    pub food_intake: Option<String>,
    pub activity: Option<String>,
    pub notes: Option<String>,
}
