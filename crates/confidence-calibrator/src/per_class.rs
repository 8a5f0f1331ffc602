//! Per-class calibration
//!
//! Runs one independent grid search per class and assembles the winners into
//! a per-class threshold vector.

use inference_core::{InferenceError, InferenceResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use threshold_classifier::{ClassMap, Threshold, ThresholdConfig};

use crate::grid_search::{CalibrationResult, GridSearch};
use crate::samples::CalibrationSamples;

/// Calibration results keyed by class name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerClassCalibration {
    pub classes: BTreeMap<String, CalibrationResult>,
}

impl PerClassCalibration {
    pub fn best_thresholds(&self) -> BTreeMap<String, f64> {
        self.classes
            .iter()
            .map(|(class, result)| (class.clone(), result.threshold()))
            .collect()
    }

    pub fn get(&self, class: &str) -> Option<&CalibrationResult> {
        self.classes.get(class)
    }

    /// Threshold vector in model output order.
    ///
    /// Indices whose class was not calibrated (or is not named in the class
    /// map) get `default`. The vector is validated the same way the
    /// classifier validates it, so a winning threshold of `1.0` is an error.
    pub fn threshold_vector(
        &self,
        class_map: &ClassMap,
        num_classes: usize,
        default: f64,
    ) -> InferenceResult<Threshold> {
        let values: Vec<f64> = (0..num_classes)
            .map(|index| {
                class_map
                    .get(index)
                    .and_then(|class| self.classes.get(class))
                    .map(CalibrationResult::threshold)
                    .unwrap_or(default)
            })
            .collect();

        let threshold = Threshold::PerClass(values);
        ThresholdConfig::new(threshold.clone(), num_classes)?;
        Ok(threshold)
    }
}

/// Calibrate every class separately.
///
/// Runs share no state and are evaluated in parallel. The first failing class
/// in name order is reported.
pub fn calibrate_per_class(
    samples: &BTreeMap<String, CalibrationSamples>,
    num_classes: usize,
    step: f64,
) -> InferenceResult<PerClassCalibration> {
    let grid = GridSearch::new(num_classes, step)?;
    let runs: Vec<(&String, &CalibrationSamples)> = samples.iter().collect();

    let results: Vec<(String, InferenceResult<CalibrationResult>)> = runs
        .par_iter()
        .map(|(class, class_samples)| {
            let result = grid.run(class_samples.true_positives(), class_samples.false_positives());
            ((*class).clone(), result)
        })
        .collect();

    let mut classes = BTreeMap::new();
    for (class, result) in results {
        match result {
            Ok(result) => {
                tracing::info!(class = %class, threshold = result.threshold(), "Class calibrated");
                classes.insert(class, result);
            }
            Err(InferenceError::InsufficientCalibrationData(reason)) => {
                return Err(InferenceError::InsufficientCalibrationData(format!(
                    "class {class}: {reason}"
                )));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(PerClassCalibration { classes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(tp: &[f64], fp: &[f64]) -> CalibrationSamples {
        CalibrationSamples::from_parts(tp.to_vec(), fp.to_vec())
    }

    #[test]
    fn test_each_class_calibrated_independently() {
        let mut by_class = BTreeMap::new();
        by_class.insert("A".to_string(), samples(&[0.9, 0.95], &[0.6, 0.65]));
        by_class.insert("B".to_string(), samples(&[0.7, 0.75], &[0.2]));

        let result = calibrate_per_class(&by_class, 2, 0.05).unwrap();
        let thresholds = result.best_thresholds();

        assert_eq!(thresholds["A"], 0.65);
        assert_eq!(thresholds["B"], 0.5);
    }

    #[test]
    fn test_matches_single_run() {
        let mut by_class = BTreeMap::new();
        let a = samples(&[0.55, 0.8, 0.9], &[0.6, 0.7]);
        by_class.insert("A".to_string(), a.clone());

        let per_class = calibrate_per_class(&by_class, 3, 0.01).unwrap();
        assert_eq!(per_class.get("A").unwrap(), &a.calibrate(3, 0.01).unwrap());
    }

    #[test]
    fn test_missing_true_positives_names_class() {
        let mut by_class = BTreeMap::new();
        by_class.insert("A".to_string(), samples(&[0.9], &[]));
        by_class.insert("B".to_string(), samples(&[], &[0.9]));

        let err = calibrate_per_class(&by_class, 2, 0.1).unwrap_err();
        match err {
            InferenceError::InsufficientCalibrationData(msg) => assert!(msg.contains("class B")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_threshold_vector_in_class_order() {
        let mut by_class = BTreeMap::new();
        by_class.insert("C".to_string(), samples(&[0.9, 0.95], &[0.6, 0.65]));
        by_class.insert("A".to_string(), samples(&[0.7, 0.75], &[0.2]));
        let calibration = calibrate_per_class(&by_class, 2, 0.05).unwrap();

        let class_map = ClassMap::from_labels(["A", "B", "C"]);
        let threshold = calibration.threshold_vector(&class_map, 3, 0.0).unwrap();
        assert_eq!(threshold, Threshold::PerClass(vec![0.5, 0.0, 0.65]));
    }

    #[test]
    fn test_threshold_vector_rejects_one() {
        let mut by_class = BTreeMap::new();
        // Every false positive sits above every true positive: best is 1.0
        by_class.insert("A".to_string(), samples(&[0.5], &[0.99]));
        let calibration = calibrate_per_class(&by_class, 2, 0.1).unwrap();
        assert_eq!(calibration.best_thresholds()["A"], 1.0);

        let class_map = ClassMap::from_labels(["A", "B"]);
        assert!(calibration.threshold_vector(&class_map, 2, 0.0).is_err());
    }

    #[test]
    fn test_results_survive_json() {
        let mut by_class = BTreeMap::new();
        by_class.insert("A".to_string(), samples(&[0.55, 0.75, 0.85, 0.95], &[0.6, 0.9]));
        by_class.insert("B".to_string(), samples(&[0.7, 0.8], &[]));
        let calibration = calibrate_per_class(&by_class, 2, 0.1).unwrap();

        let json = serde_json::to_string(&calibration).unwrap();
        let restored: PerClassCalibration = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, calibration);

        let a = calibration.get("A").unwrap();
        let value = serde_json::to_value(a).unwrap();
        assert_eq!(value["curve"].as_array().unwrap().len(), 6);
        assert_eq!(value["best"]["threshold"], a.threshold());
        let restored: CalibrationResult = serde_json::from_value(value).unwrap();
        assert_eq!(&restored, a);
    }
}
