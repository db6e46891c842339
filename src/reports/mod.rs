//! Period statistics for the admin dashboard.

pub mod aggregator;
pub mod period;

pub use aggregator::{ReportAggregator, ReportOutcome, ReportSummary};
pub use period::ReportPeriod;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{0}")]
    Validation(String),
    #[error("store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
}
