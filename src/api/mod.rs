//! JSON-over-HTTP surface for the patient, staff and admin clients.
//!
//! `api_router()` returns a composable `Router`; `run()` mounts it on a
//! tokio listener.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
