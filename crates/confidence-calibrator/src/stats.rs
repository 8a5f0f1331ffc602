//! Confidence distribution statistics
//!
//! Summaries used to eyeball where the true- and false-positive populations
//! sit before (or after) running the grid search.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// `p`-th percentile of non-empty sorted data, interpolating linearly
/// between the two closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Location and spread of a set of confidences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
}

impl ConfidenceSummary {
    /// `None` for an empty slice.
    pub fn from_confidences(confidences: &[f64]) -> Option<Self> {
        if confidences.is_empty() {
            return None;
        }

        let mean = confidences.mean();
        let std_dev = confidences.population_std_dev();
        let min = confidences.min();
        let max = confidences.max();

        let mut sorted = confidences.to_vec();
        sorted.sort_by(f64::total_cmp);
        let p25 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let p75 = percentile(&sorted, 75.0);

        Some(Self {
            count: confidences.len(),
            mean,
            std_dev,
            min,
            max,
            p25,
            median,
            p75,
        })
    }

    /// Summaries keyed by class, skipping classes without samples.
    pub fn per_class(confidences: &BTreeMap<String, Vec<f64>>) -> BTreeMap<String, ConfidenceSummary> {
        confidences
            .iter()
            .filter_map(|(class, values)| Self::from_confidences(values).map(|s| (class.clone(), s)))
            .collect()
    }
}

/// Summaries of both sample populations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub true_positives: Option<ConfidenceSummary>,
    pub false_positives: Option<ConfidenceSummary>,
}

impl SampleSummary {
    /// Gap between the two population means, when both exist.
    pub fn mean_separation(&self) -> Option<f64> {
        match (&self.true_positives, &self.false_positives) {
            (Some(tp), Some(fp)) => Some(tp.mean - fp.mean),
            _ => None,
        }
    }
}
