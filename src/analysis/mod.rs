//! Classification on ingest and the per-patient pattern pipeline:
//! tokenize, count, synthesize advice, then write through the dedup gate.
//! Specialists read the resulting advice through [`alerts`].

pub mod alerts;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod frequency;
pub mod synthesizer;
pub mod tokenizer;

pub use classifier::{classify, ClassifyError};
pub use config::AnalysisConfig;
pub use engine::{AnalysisEngine, AnalysisOutcome, EngineError};
pub use synthesizer::AdviceTier;
