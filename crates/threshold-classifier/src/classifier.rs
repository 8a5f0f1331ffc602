//! Thresholded classification
//!
//! Picks the top-scoring class and decides whether its score is high enough
//! to report, or whether the input should be labeled as background.

use inference_core::{ClassificationOutcome, InferenceError, InferenceResult, Label};

use crate::class_map::ClassMap;
use crate::threshold::{Threshold, ThresholdConfig};

/// Opaque model producing one score per class, in class-index order.
pub trait Scorer<I: ?Sized>: Send + Sync {
    fn score(&self, input: &I) -> InferenceResult<Vec<f64>>;
}

impl<I, F> Scorer<I> for F
where
    I: ?Sized,
    F: Fn(&I) -> InferenceResult<Vec<f64>> + Send + Sync,
{
    fn score(&self, input: &I) -> InferenceResult<Vec<f64>> {
        self(input)
    }
}

/// Index of the first maximum score.
fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    name: String,
    num_classes: usize,
    class_map: ClassMap,
    config: ThresholdConfig,
}

impl ThresholdClassifier {
    /// Fails with `InvalidThresholdConfig` when the threshold does not fit the
    /// model's class count.
    pub fn new(
        name: impl Into<String>,
        num_classes: usize,
        class_map: ClassMap,
        threshold: Threshold,
    ) -> InferenceResult<Self> {
        let name = name.into();
        if num_classes == 0 {
            return Err(InferenceError::InvalidThresholdConfig(format!(
                "[{name}] model must have at least one class"
            )));
        }
        let config = ThresholdConfig::new(threshold, num_classes)?;
        tracing::info!(
            service = %name,
            num_classes,
            threshold = ?config.threshold(),
            "Thresholded classifier configured"
        );
        Ok(Self {
            name,
            num_classes,
            class_map,
            config,
        })
    }

    /// Classifier that never demotes, used to collect calibration data.
    pub fn unthresholded(
        name: impl Into<String>,
        num_classes: usize,
        class_map: ClassMap,
    ) -> InferenceResult<Self> {
        Self::new(name, num_classes, class_map, Threshold::disabled())
    }

    pub fn classify(&self, scores: &[f64]) -> InferenceResult<ClassificationOutcome> {
        if scores.len() != self.num_classes {
            return Err(InferenceError::ScoreDimension {
                expected: self.num_classes,
                actual: scores.len(),
            });
        }

        let index = argmax(scores);
        let class_name = self
            .class_map
            .get(index)
            .ok_or_else(|| InferenceError::UnexpectedClass {
                service: self.name.clone(),
                index,
            })?;
        let confidence = scores[index];

        let label = if confidence < self.config.resolve(index) {
            tracing::debug!(service = %self.name, class = class_name, confidence, "Demoted to background");
            Label::Background
        } else {
            Label::Predicted(class_name.to_string())
        };

        Ok(ClassificationOutcome { label, confidence })
    }

    /// Scores `input` with `scorer` and classifies the result.
    pub fn classify_with<I, S>(&self, scorer: &S, input: &I) -> InferenceResult<ClassificationOutcome>
    where
        I: ?Sized,
        S: Scorer<I> + ?Sized,
    {
        let scores = scorer.score(input)?;
        self.classify(&scores)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn class_map(&self) -> &ClassMap {
        &self.class_map
    }

    pub fn threshold(&self) -> &Threshold {
        self.config.threshold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc(threshold: Threshold) -> ThresholdClassifier {
        ThresholdClassifier::new("test", 3, ClassMap::from_labels(["A", "B", "C"]), threshold).unwrap()
    }

    #[test]
    fn test_scalar_threshold_passes() {
        let outcome = abc(Threshold::Scalar(0.5)).classify(&[0.1, 0.05, 0.85]).unwrap();
        assert_eq!(outcome.label, Label::Predicted("C".into()));
        assert_eq!(outcome.confidence, 0.85);
    }

    #[test]
    fn test_scalar_threshold_demotes_without_touching_confidence() {
        let outcome = abc(Threshold::Scalar(0.9)).classify(&[0.1, 0.05, 0.85]).unwrap();
        assert_eq!(outcome.predicted_label(), "bg");
        assert_eq!(outcome.confidence, 0.85);
    }

    #[test]
    fn test_score_equal_to_threshold_passes() {
        let outcome = abc(Threshold::Scalar(0.6)).classify(&[0.6, 0.3, 0.1]).unwrap();
        assert_eq!(outcome.predicted_label(), "A");
    }

    #[test]
    fn test_demotion_iff_below_threshold() {
        let cases = [
            [0.2, 0.3, 0.5],
            [0.7, 0.2, 0.1],
            [0.34, 0.33, 0.33],
            [0.0, 0.99, 0.01],
        ];
        for t in [0.0, 0.3, 0.5, 0.7, 0.95] {
            let classifier = abc(Threshold::Scalar(t));
            for scores in &cases {
                let top = scores.iter().cloned().fold(f64::MIN, f64::max);
                let outcome = classifier.classify(scores).unwrap();
                assert_eq!(outcome.label.is_background(), top < t, "t={t} scores={scores:?}");
                assert_eq!(outcome.confidence, top);
            }
        }
    }

    #[test]
    fn test_per_class_uses_predicted_class_entry() {
        // Global minimum (0.3) would let 0.6 pass; C's own bar (0.8) demotes it.
        let classifier = abc(Threshold::PerClass(vec![0.3, 0.5, 0.8]));
        let outcome = classifier.classify(&[0.3, 0.1, 0.6]).unwrap();
        assert!(outcome.label.is_background());
        assert_eq!(outcome.confidence, 0.6);

        // Global maximum (0.8) would demote 0.6; A's own bar (0.3) keeps it.
        let outcome = classifier.classify(&[0.6, 0.1, 0.3]).unwrap();
        assert_eq!(outcome.predicted_label(), "A");
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let outcome = abc(Threshold::Scalar(0.0)).classify(&[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(outcome.predicted_label(), "A");
    }

    #[test]
    fn test_unnormalized_scores_are_trusted() {
        let outcome = abc(Threshold::Scalar(0.5)).classify(&[0.9, 0.9, 0.95]).unwrap();
        assert_eq!(outcome.predicted_label(), "C");
        assert_eq!(outcome.confidence, 0.95);
    }

    #[test]
    fn test_unmapped_index_is_unexpected_class() {
        let classifier =
            ThresholdClassifier::new("sparse", 3, ClassMap::from_pairs([(0, "A"), (1, "B")]), Threshold::Scalar(0.0))
                .unwrap();
        let err = classifier.classify(&[0.1, 0.2, 0.7]).unwrap_err();
        assert!(matches!(err, InferenceError::UnexpectedClass { index: 2, .. }));
        assert!(!err.is_domain());
    }

    #[test]
    fn test_wrong_score_length() {
        let err = abc(Threshold::Scalar(0.5)).classify(&[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, InferenceError::ScoreDimension { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_invalid_thresholds_fail_at_construction() {
        let labels = || ClassMap::from_labels(["A", "B", "C"]);
        assert!(ThresholdClassifier::new("t", 3, labels(), Threshold::Scalar(1.0)).is_err());
        assert!(ThresholdClassifier::new("t", 3, labels(), Threshold::Scalar(-0.5)).is_err());
        assert!(ThresholdClassifier::new("t", 3, labels(), Threshold::PerClass(vec![0.5; 2])).is_err());
        assert!(ThresholdClassifier::new("t", 0, ClassMap::default(), Threshold::Scalar(0.5)).is_err());
    }

    #[test]
    fn test_unthresholded_never_demotes() {
        let classifier = ThresholdClassifier::unthresholded("t", 3, ClassMap::from_labels(["A", "B", "C"])).unwrap();
        let outcome = classifier.classify(&[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(outcome.predicted_label(), "A");
    }

    #[test]
    fn test_classify_with_closure_scorer() {
        let scorer = |input: &str| -> InferenceResult<Vec<f64>> {
            Ok(if input == "c" { vec![0.1, 0.1, 0.8] } else { vec![0.8, 0.1, 0.1] })
        };
        let classifier = abc(Threshold::Scalar(0.5));
        assert_eq!(classifier.classify_with(&scorer, "c").unwrap().predicted_label(), "C");
        assert_eq!(classifier.classify_with(&scorer, "a").unwrap().predicted_label(), "A");
    }
}
