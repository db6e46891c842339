//! SQLite persistence for readings, thresholds, recommendations and
//! patient-specialist assignments.

pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{
    Category, NewReading, PatientAssignment, Reading, Recommendation, RecommendationSource,
    ThresholdConfig,
};
