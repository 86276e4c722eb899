//! # Pipeline Module
//!
//! High-level orchestration of analysis runs.
//! Builds step lists from analysis descriptions, executes them phase by phase
//! and scores the surviving genes.

pub mod analysis;
pub mod batch;
pub mod builder;
pub mod runner;
pub mod scoring;

pub use analysis::{Analysis, AnalysisMode, AnalysisSpec, AnalysisStep, ScoringMode, StepSpec};
pub use batch::{BatchOutcome, BatchRunner};
pub use builder::AnalysisBuilder;
pub use runner::{AnalysisResults, AnalysisRunner, RunState};
