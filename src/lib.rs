//! Regression, step-change and flake detection over CI run history.
//!
//! The [`detection`] detectors and [`analysis`] orchestrator are pure
//! functions of in-memory samples. [`samples`] defines the inputs and the
//! provider seam, [`insights`] the results, and [`output`] renders them.

pub mod analysis;
pub mod config;
pub mod detection;
pub mod error;
pub mod insights;
pub mod output;
pub mod samples;
pub mod time_utils;

pub use analysis::{analyze_history, analyze_repo, AnalysisParams};
pub use error::{HunterError, Result};
pub use insights::{AnalysisResult, ChangePoint, Flake, Reason, Regression};
