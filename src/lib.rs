// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod dispute;
pub mod entities;
pub mod error;
pub mod explanation;
pub mod key_points;
pub mod keywords;
pub mod language;
pub mod lexicon;
pub mod metrics;
pub mod performance;
pub mod pipeline;
pub mod preprocess;
pub mod recommend;
pub mod report;
pub mod satisfaction;
pub mod segment;
pub mod sentiment;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::{ClassifierError, EngineError};
pub use crate::language::{detect_language, Language};
pub use crate::pipeline::{DisputeRequest, Engine, FeedbackRequest, PerformanceRequest};
pub use crate::preprocess::preprocess;
pub use crate::sentiment::{Provenance, SentenceVerdict, Sentiment};
