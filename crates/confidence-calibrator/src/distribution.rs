//! Prediction distribution
//!
//! For samples of one known class, how the predictions spread over labels
//! and how confident the model was for each label it chose.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats::ConfidenceSummary;

/// One predicted label's slice of the distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionShare {
    pub count: usize,
    /// Fraction of all samples of the class
    pub share: f64,
    pub confidence: ConfidenceSummary,
}

/// Confidences of one class's samples keyed by predicted label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionDistribution {
    pub actual: String,
    pub predictions: BTreeMap<String, Vec<f64>>,
}

impl PredictionDistribution {
    pub fn new(actual: impl Into<String>) -> Self {
        Self {
            actual: actual.into(),
            predictions: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, predicted: &str, confidence: f64) {
        self.predictions.entry(predicted.to_string()).or_default().push(confidence);
    }

    pub fn total(&self) -> usize {
        self.predictions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Fraction of samples predicted as `label`; 0 when never predicted.
    pub fn share(&self, label: &str) -> f64 {
        let total = self.total();
        match self.predictions.get(label) {
            Some(confidences) if total > 0 => confidences.len() as f64 / total as f64,
            _ => 0.0,
        }
    }

    /// Share of samples predicted as the actual class.
    pub fn accuracy(&self) -> f64 {
        self.share(&self.actual)
    }

    pub fn shares(&self) -> BTreeMap<String, PredictionShare> {
        let total = self.total() as f64;
        self.predictions
            .iter()
            .filter_map(|(label, confidences)| {
                let confidence = ConfidenceSummary::from_confidences(confidences)?;
                Some((
                    label.clone(),
                    PredictionShare {
                        count: confidences.len(),
                        share: confidences.len() as f64 / total,
                        confidence,
                    },
                ))
            })
            .collect()
    }
}
