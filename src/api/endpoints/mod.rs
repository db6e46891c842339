pub mod ai;
pub mod health;
pub mod readings;
pub mod recommendations;
pub mod reports;
pub mod specialist;
pub mod thresholds;
