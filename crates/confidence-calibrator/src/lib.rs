//! Threshold Calibration Engine
//!
//! Chooses the background threshold of a thresholded classifier from labeled
//! confidence samples. Candidate thresholds are swept over a grid and the one
//! closest to perfect separation (every true positive kept, every false
//! positive rejected) wins.

pub mod distribution;
pub mod evaluation;
pub mod grid_search;
pub mod per_class;
pub mod samples;
pub mod stats;

pub use distribution::{PredictionDistribution, PredictionShare};
pub use evaluation::{BackgroundPerformance, ClassPerformance, OutcomeKind};
pub use grid_search::{calibrate, evaluate, CalibrationResult, GridSearch, GridSearchResult, DEFAULT_STEP, MIN_STEP};
pub use per_class::{calibrate_per_class, PerClassCalibration};
pub use samples::{CalibrationSample, CalibrationSamples};
pub use stats::{ConfidenceSummary, SampleSummary};
