//! Progress reporting for the cleaning pipeline.
//!
//! Reporting is synchronous: the pipeline calls the reporter inline between
//! stages on the caller's thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use flight_cleaning::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(&table)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Converting input into a flight table
    Initializing,
    /// Rebuilding the flight code sequence
    IdentifierReconstruction,
    /// Splitting routes into To / From
    RouteSplitting,
    /// Normalizing airline names
    NameNormalization,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::IdentifierReconstruction => "Reconstructing Flight Codes",
            Self::RouteSplitting => "Splitting Routes",
            Self::NameNormalization => "Normalizing Airline Names",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.10,
            Self::IdentifierReconstruction => 0.30,
            Self::RouteSplitting => 0.30,
            Self::NameNormalization => 0.30,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::IdentifierReconstruction => 0.10,
            Self::RouteSplitting => 0.40,
            Self::NameNormalization => 0.70,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates during cleaning.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_stage_progress_is_cumulative() {
        let update = ProgressUpdate::new(CleaningStage::RouteSplitting, 0.5, "halfway");
        assert!((update.progress - 0.55).abs() < 1e-6);
        assert_eq!(update.stage_progress, 0.5);
    }

    #[test]
    fn test_progress_is_clamped() {
        let update = ProgressUpdate::new(CleaningStage::NameNormalization, 4.0, "over");
        assert_eq!(update.progress, 1.0);
        assert_eq!(update.stage_progress, 1.0);
    }

    #[test]
    fn test_terminal_updates() {
        assert_eq!(ProgressUpdate::complete("done").progress, 1.0);
        assert_eq!(ProgressUpdate::failed("boom").stage, CleaningStage::Failed);
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Mutex::new(Vec::new());
        let reporter = ClosureProgressReporter::new(|update: ProgressUpdate| {
            seen.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new(CleaningStage::Initializing, 0.0, "start"));
        reporter.report(ProgressUpdate::complete("done"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CleaningStage::Initializing, CleaningStage::Complete]
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(CleaningStage::Initializing.display_name(), "Initializing");
        assert_eq!(
            CleaningStage::IdentifierReconstruction.display_name(),
            "Reconstructing Flight Codes"
        );
        assert_eq!(
            CleaningStage::NameNormalization.display_name(),
            "Normalizing Airline Names"
        );
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&CleaningStage::IdentifierReconstruction).unwrap();
        assert_eq!(json, "\"identifier_reconstruction\"");
    }
}
