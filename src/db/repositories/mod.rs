pub mod assignments;
pub mod readings;
pub mod recommendations;
pub mod thresholds;
