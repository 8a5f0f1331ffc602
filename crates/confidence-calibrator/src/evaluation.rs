//! Background threshold performance
//!
//! Tallies, per actual class, how a thresholded classifier's responses split
//! into correct, incorrect, background and error outcomes. Used to check a
//! threshold picked by the grid search against labeled data.

use inference_core::BACKGROUND_LABEL;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Correct,
    Incorrect,
    Background,
    Error,
}

impl OutcomeKind {
    /// Classify a response label against the known class.
    ///
    /// `None` stands for an error response. The background literal is
    /// checked before the class comparison.
    pub fn of(actual: &str, response: Option<&str>) -> Self {
        match response {
            None => OutcomeKind::Error,
            Some(label) if label == BACKGROUND_LABEL => OutcomeKind::Background,
            Some(label) if label == actual => OutcomeKind::Correct,
            Some(_) => OutcomeKind::Incorrect,
        }
    }
}

/// Outcome counts for one actual class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPerformance {
    pub correct: usize,
    pub incorrect: usize,
    pub background: usize,
    pub error: usize,
}

impl ClassPerformance {
    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Correct => self.correct += 1,
            OutcomeKind::Incorrect => self.incorrect += 1,
            OutcomeKind::Background => self.background += 1,
            OutcomeKind::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect + self.background + self.error
    }

    fn percent(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        }
    }

    pub fn correct_pct(&self) -> f64 {
        self.percent(self.correct)
    }

    pub fn incorrect_pct(&self) -> f64 {
        self.percent(self.incorrect)
    }

    pub fn background_pct(&self) -> f64 {
        self.percent(self.background)
    }

    pub fn error_pct(&self) -> f64 {
        self.percent(self.error)
    }
}

/// Outcome counts keyed by actual class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackgroundPerformance {
    pub classes: BTreeMap<String, ClassPerformance>,
}

impl BackgroundPerformance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, actual: &str, kind: OutcomeKind) {
        self.classes.entry(actual.to_string()).or_default().record(kind);
    }

    pub fn record_response(&mut self, actual: &str, response: Option<&str>) {
        self.record(actual, OutcomeKind::of(actual, response));
    }

    pub fn class(&self, actual: &str) -> Option<&ClassPerformance> {
        self.classes.get(actual)
    }

    /// Counts summed over every class.
    pub fn overall(&self) -> ClassPerformance {
        self.classes.values().fold(ClassPerformance::default(), |mut acc, c| {
            acc.correct += c.correct;
            acc.incorrect += c.incorrect;
            acc.background += c.background;
            acc.error += c.error;
            acc
        })
    }
}
