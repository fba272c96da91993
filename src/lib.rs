// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod checkin;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod profile;
pub mod recommend;
pub mod score;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::checkin::{CheckIn, Condition, Environment, Mood};
pub use crate::config::EngineConfig;
pub use crate::engine::{Outcome, RitmoEngine};
pub use crate::error::{CheckInError, EngineError, StoreError};
