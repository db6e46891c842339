pub mod assignment;
pub mod reading;
pub mod recommendation;
pub mod threshold;

pub use assignment::PatientAssignment;
pub use reading::{Category, NewReading, Reading};
pub use recommendation::{Recommendation, RecommendationSource};
pub use threshold::ThresholdConfig;
