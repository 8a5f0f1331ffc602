//! Background thresholds
//!
//! A threshold is either one value shared by every class or one value per
//! class. It is validated against the model's class count once, when the
//! classifier is built, and never changes afterwards.

use inference_core::{InferenceError, InferenceResult};
use serde::{Deserialize, Serialize};

/// Threshold as written in configuration: `0.65` or `[0.7, 0.6, ...]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    /// Applies to every class
    Scalar(f64),
    /// One entry per class, in the model's class order
    PerClass(Vec<f64>),
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Scalar(0.0)
    }
}

impl Threshold {
    /// A threshold that never demotes a prediction.
    pub fn disabled() -> Self {
        Threshold::Scalar(0.0)
    }

    /// True when every class shares the given value.
    pub fn is_uniform(&self, value: f64) -> bool {
        match self {
            Threshold::Scalar(t) => *t == value,
            Threshold::PerClass(ts) => ts.iter().all(|t| *t == value),
        }
    }
}

fn check_range(t: f64) -> InferenceResult<()> {
    if t.is_finite() && (0.0..1.0).contains(&t) {
        Ok(())
    } else {
        Err(InferenceError::InvalidThresholdConfig(format!(
            "background threshold must be between 0 (inclusive) and 1 (exclusive), got {t}"
        )))
    }
}

/// A [`Threshold`] checked against a fixed class count
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    threshold: Threshold,
}

impl ThresholdConfig {
    pub fn new(threshold: Threshold, num_classes: usize) -> InferenceResult<Self> {
        match &threshold {
            Threshold::Scalar(t) => check_range(*t)?,
            Threshold::PerClass(ts) => {
                if ts.len() != num_classes {
                    return Err(InferenceError::InvalidThresholdConfig(format!(
                        "threshold list has {} entries but the model has {} classes",
                        ts.len(),
                        num_classes
                    )));
                }
                for t in ts {
                    check_range(*t)?;
                }
            }
        }
        Ok(Self { threshold })
    }

    /// Threshold that applies when the model predicts `class_index`.
    ///
    /// Callers pass an index below the validated class count.
    pub fn resolve(&self, class_index: usize) -> f64 {
        match &self.threshold {
            Threshold::Scalar(t) => *t,
            Threshold::PerClass(ts) => ts[class_index],
        }
    }

    pub fn threshold(&self) -> &Threshold {
        &self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_bounds() {
        assert!(ThresholdConfig::new(Threshold::Scalar(0.0), 3).is_ok());
        assert!(ThresholdConfig::new(Threshold::Scalar(0.999), 3).is_ok());
        assert!(ThresholdConfig::new(Threshold::Scalar(1.0), 3).is_err());
        assert!(ThresholdConfig::new(Threshold::Scalar(-0.01), 3).is_err());
        assert!(ThresholdConfig::new(Threshold::Scalar(f64::NAN), 3).is_err());
    }

    #[test]
    fn test_per_class_length_must_match() {
        let err = ThresholdConfig::new(Threshold::PerClass(vec![0.5, 0.6]), 3).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidThresholdConfig(_)));

        assert!(ThresholdConfig::new(Threshold::PerClass(vec![0.5, 0.6, 0.7]), 3).is_ok());
    }

    #[test]
    fn test_per_class_entries_checked() {
        let err = ThresholdConfig::new(Threshold::PerClass(vec![0.5, 1.0, 0.7]), 3);
        assert!(err.is_err());
    }

    #[test]
    fn test_resolve() {
        let scalar = ThresholdConfig::new(Threshold::Scalar(0.4), 3).unwrap();
        assert_eq!(scalar.resolve(0), 0.4);
        assert_eq!(scalar.resolve(2), 0.4);

        let per_class = ThresholdConfig::new(Threshold::PerClass(vec![0.1, 0.2, 0.3]), 3).unwrap();
        assert_eq!(per_class.resolve(1), 0.2);
    }

    #[test]
    fn test_deserialize_scalar_or_list() {
        let scalar: Threshold = serde_json::from_str("0.65").unwrap();
        assert_eq!(scalar, Threshold::Scalar(0.65));

        let int: Threshold = serde_json::from_str("0").unwrap();
        assert_eq!(int, Threshold::Scalar(0.0));

        let list: Threshold = serde_json::from_str("[0.7, 0.6]").unwrap();
        assert_eq!(list, Threshold::PerClass(vec![0.7, 0.6]));
    }

    #[test]
    fn test_is_uniform() {
        assert!(Threshold::Scalar(0.5).is_uniform(0.5));
        assert!(Threshold::PerClass(vec![0.5, 0.5]).is_uniform(0.5));
        assert!(!Threshold::PerClass(vec![0.5, 0.6]).is_uniform(0.5));
    }
}
