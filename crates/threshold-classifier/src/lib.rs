//! Confidence-Thresholded Classifier
//!
//! Turns a raw class-score vector into a classification outcome, demoting
//! predictions whose top score misses the configured bar to the background
//! label.

pub mod class_map;
pub mod classifier;
pub mod threshold;

pub use class_map::ClassMap;
pub use classifier::{Scorer, ThresholdClassifier};
pub use threshold::{Threshold, ThresholdConfig};
