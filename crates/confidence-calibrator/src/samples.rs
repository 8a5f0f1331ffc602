//! Labeled confidence samples
//!
//! A sample is the top-class confidence of one labeled calibration input,
//! tagged by whether the unthresholded prediction matched the known class.

use inference_core::InferenceResult;
use serde::{Deserialize, Serialize};

use crate::grid_search::{calibrate, CalibrationResult};
use crate::stats::{ConfidenceSummary, SampleSummary};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub confidence: f64,
    pub is_true_positive: bool,
}

/// True- and false-positive confidences of one calibration run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSamples {
    true_positives: Vec<f64>,
    false_positives: Vec<f64>,
}

impl CalibrationSamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(true_positives: Vec<f64>, false_positives: Vec<f64>) -> Self {
        Self {
            true_positives,
            false_positives,
        }
    }

    /// Merge several runs, e.g. several classes against a shared background
    /// set.
    ///
    /// Classes with more samples weigh more in the pooled rates; nothing here
    /// rebalances them.
    pub fn pooled<'a, I>(runs: I) -> Self
    where
        I: IntoIterator<Item = &'a CalibrationSamples>,
    {
        let mut pooled = Self::new();
        for run in runs {
            pooled.true_positives.extend_from_slice(&run.true_positives);
            pooled.false_positives.extend_from_slice(&run.false_positives);
        }
        pooled
    }

    pub fn push(&mut self, sample: CalibrationSample) {
        if sample.is_true_positive {
            self.true_positives.push(sample.confidence);
        } else {
            self.false_positives.push(sample.confidence);
        }
    }

    /// Record one unthresholded prediction against its known class.
    pub fn record(&mut self, predicted: &str, actual: &str, confidence: f64) {
        self.push(CalibrationSample {
            confidence,
            is_true_positive: predicted == actual,
        });
    }

    pub fn true_positives(&self) -> &[f64] {
        &self.true_positives
    }

    pub fn false_positives(&self) -> &[f64] {
        &self.false_positives
    }

    pub fn samples(&self) -> impl Iterator<Item = CalibrationSample> + '_ {
        let tp = self.true_positives.iter().map(|&confidence| CalibrationSample {
            confidence,
            is_true_positive: true,
        });
        let fp = self.false_positives.iter().map(|&confidence| CalibrationSample {
            confidence,
            is_true_positive: false,
        });
        tp.chain(fp)
    }

    pub fn len(&self) -> usize {
        self.true_positives.len() + self.false_positives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Share of samples whose unthresholded prediction was right.
    pub fn accuracy(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.true_positives.len() as f64 / self.len() as f64)
        }
    }

    pub fn summary(&self) -> SampleSummary {
        SampleSummary {
            true_positives: ConfidenceSummary::from_confidences(&self.true_positives),
            false_positives: ConfidenceSummary::from_confidences(&self.false_positives),
        }
    }

    /// Grid-search these samples.
    pub fn calibrate(&self, num_classes: usize, step: f64) -> InferenceResult<CalibrationResult> {
        calibrate(&self.true_positives, &self.false_positives, num_classes, step)
    }
}

impl Extend<CalibrationSample> for CalibrationSamples {
    fn extend<T: IntoIterator<Item = CalibrationSample>>(&mut self, iter: T) {
        for sample in iter {
            self.push(sample);
        }
    }
}

impl FromIterator<CalibrationSample> for CalibrationSamples {
    fn from_iter<T: IntoIterator<Item = CalibrationSample>>(iter: T) -> Self {
        let mut samples = Self::new();
        samples.extend(iter);
        samples
    }
}
