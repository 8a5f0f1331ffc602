//! Threshold Grid Search
//!
//! Sweeps candidate thresholds and measures, for each one, the fraction of
//! true-positive and false-positive samples that would survive it. The loss
//! is the squared distance from `(tp_rate, fp_rate)` to the ideal point
//! `(1, 0)`, minus the constant `1`:
//!
//! ```text
//! loss(t) = tp_rate(t)^2 - 2 * tp_rate(t) + fp_rate(t)^2
//! ```
//!
//! Samples must come from a classifier running without a threshold, since
//! demoted predictions would otherwise already be missing from the data.

use inference_core::{InferenceError, InferenceResult};
use serde::{Deserialize, Serialize};

/// Grid spacing used when none is given
pub const DEFAULT_STEP: f64 = 0.01;

/// Finest grid spacing accepted
pub const MIN_STEP: f64 = 1e-6;

/// Metrics for one candidate threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    /// Candidate threshold
    pub threshold: f64,
    /// Squared distance to `(1, 0)` minus one (lower is better)
    pub loss: f64,
    /// Fraction of true-positive confidences strictly above the threshold
    pub true_positive_rate: f64,
    /// Fraction of false-positive confidences strictly above the threshold
    pub false_positive_rate: f64,
}

impl GridSearchResult {
    /// Euclidean distance from this operating point to perfect separation.
    pub fn distance_to_ideal(&self) -> f64 {
        ((1.0 - self.true_positive_rate).powi(2) + self.false_positive_rate.powi(2)).sqrt()
    }
}

/// Outcome of a full sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// One entry per grid point, ascending by threshold
    pub curve: Vec<GridSearchResult>,
    /// First grid point with the minimum loss
    pub best: GridSearchResult,
}

impl CalibrationResult {
    pub fn threshold(&self) -> f64 {
        self.best.threshold
    }

    /// `(tp_rate, fp_rate)` pairs traced across the grid.
    pub fn operating_curve(&self) -> Vec<(f64, f64)> {
        self.curve
            .iter()
            .map(|r| (r.true_positive_rate, r.false_positive_rate))
            .collect()
    }
}

/// Fraction of `confidences` strictly above `threshold`.
fn survival_rate(confidences: &[f64], threshold: f64) -> f64 {
    if confidences.is_empty() {
        return 0.0;
    }
    let above = confidences.iter().filter(|&&c| c > threshold).count();
    above as f64 / confidences.len() as f64
}

/// Evaluate a single threshold.
///
/// `fp_confidences` may be empty, in which case the false-positive rate is 0
/// at every threshold. `tp_confidences` may not.
pub fn evaluate(
    threshold: f64,
    tp_confidences: &[f64],
    fp_confidences: &[f64],
) -> InferenceResult<GridSearchResult> {
    if tp_confidences.is_empty() {
        return Err(InferenceError::InsufficientCalibrationData(
            "no true-positive samples".to_string(),
        ));
    }
    Ok(evaluate_unchecked(threshold, tp_confidences, fp_confidences))
}

fn evaluate_unchecked(threshold: f64, tp_confidences: &[f64], fp_confidences: &[f64]) -> GridSearchResult {
    let tp_rate = survival_rate(tp_confidences, threshold);
    let fp_rate = survival_rate(fp_confidences, threshold);
    GridSearchResult {
        threshold,
        loss: tp_rate * tp_rate - 2.0 * tp_rate + fp_rate * fp_rate,
        true_positive_rate: tp_rate,
        false_positive_rate: fp_rate,
    }
}

/// Grid definition: multiples of `step` in `[0, 1]`, from `1 / num_classes` up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSearch {
    step: f64,
    num_classes: usize,
}

impl GridSearch {
    pub fn new(num_classes: usize, step: f64) -> InferenceResult<Self> {
        if num_classes == 0 {
            return Err(InferenceError::InvalidCalibrationConfig(
                "number of classes must be positive".to_string(),
            ));
        }
        if !step.is_finite() || step < MIN_STEP || step > 1.0 {
            return Err(InferenceError::InvalidCalibrationConfig(format!(
                "grid step must be in [{MIN_STEP}, 1], got {step}"
            )));
        }
        Ok(Self { step, num_classes })
    }

    pub fn with_default_step(num_classes: usize) -> InferenceResult<Self> {
        Self::new(num_classes, DEFAULT_STEP)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Lowest threshold a softmax top score can fall to.
    pub fn lower_bound(&self) -> f64 {
        1.0 / self.num_classes as f64
    }

    /// Candidate thresholds in ascending order.
    pub fn candidates(&self) -> Vec<f64> {
        let per_unit = 1.0 / self.step;
        let rounded = per_unit.round();
        // Divide when the step splits [0, 1] evenly so that e.g. 0.3 is
        // exactly 30 / 100 rather than 30 * 0.01.
        let points: Vec<f64> = if (per_unit - rounded).abs() < 1e-9 {
            let n = rounded as usize;
            (0..=n).map(|i| i as f64 / rounded).collect()
        } else {
            let n = per_unit.floor() as usize;
            (0..=n).map(|i| i as f64 * self.step).collect()
        };

        let lower = self.lower_bound();
        points.into_iter().filter(|t| *t >= lower).collect()
    }

    /// Sweep the grid over the given samples.
    pub fn run(&self, tp_confidences: &[f64], fp_confidences: &[f64]) -> InferenceResult<CalibrationResult> {
        if tp_confidences.is_empty() {
            return Err(InferenceError::InsufficientCalibrationData(
                "no true-positive samples".to_string(),
            ));
        }

        let curve: Vec<GridSearchResult> = self
            .candidates()
            .into_iter()
            .map(|t| evaluate_unchecked(t, tp_confidences, fp_confidences))
            .collect();

        // Strict `<` keeps the earliest (lowest) threshold on equal loss.
        let mut best: Option<GridSearchResult> = None;
        for point in &curve {
            match best {
                Some(b) if point.loss >= b.loss => {}
                _ => best = Some(*point),
            }
        }
        let best = best.ok_or_else(|| {
            InferenceError::InvalidCalibrationConfig(format!(
                "grid with step {} has no point at or above 1/{}",
                self.step, self.num_classes
            ))
        })?;

        tracing::debug!(
            threshold = best.threshold,
            loss = best.loss,
            tp_samples = tp_confidences.len(),
            fp_samples = fp_confidences.len(),
            grid_points = curve.len(),
            "Grid search finished"
        );

        Ok(CalibrationResult { curve, best })
    }
}

/// Find the threshold that best separates true from false positives.
pub fn calibrate(
    tp_confidences: &[f64],
    fp_confidences: &[f64],
    num_classes: usize,
    step: f64,
) -> InferenceResult<CalibrationResult> {
    GridSearch::new(num_classes, step)?.run(tp_confidences, fp_confidences)
}
