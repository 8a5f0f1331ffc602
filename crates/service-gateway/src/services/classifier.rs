use inference_core::{InferenceResult, InferenceService, Payload, Prediction};
use std::sync::Arc;
use threshold_classifier::{ClassMap, Scorer, Threshold, ThresholdClassifier};

use crate::config::ServiceConfig;
use crate::image::{retag_unreadable, ImagePayload};

pub const BANKNOTE: &str = "banknote";

/// Turkish banknote denominations, by model output index.
pub fn banknote_class_map() -> ClassMap {
    ClassMap::from_pairs([(0, "10"), (1, "100"), (2, "20"), (3, "200"), (4, "5"), (5, "50")])
}

pub const BANKNOTE_CLASSES: usize = 6;

/// Image classification service backed by a thresholded classifier.
pub struct ClassifierService {
    classifier: ThresholdClassifier,
    scorer: Arc<dyn Scorer<ImagePayload>>,
}

impl ClassifierService {
    pub fn new(classifier: ThresholdClassifier, scorer: Arc<dyn Scorer<ImagePayload>>) -> Self {
        tracing::info!(service = classifier.name(), "Initiating new service");
        Self { classifier, scorer }
    }

    /// Builds the classifier from the service's `background_threshold`
    /// setting (no threshold when absent).
    pub fn from_config(
        name: &str,
        num_classes: usize,
        class_map: ClassMap,
        config: Option<&ServiceConfig>,
        scorer: Arc<dyn Scorer<ImagePayload>>,
    ) -> InferenceResult<Self> {
        let threshold = config
            .and_then(|c| c.background_threshold.clone())
            .unwrap_or_default();
        let classifier = ThresholdClassifier::new(name, num_classes, class_map, threshold)?;
        Ok(Self::new(classifier, scorer))
    }

    pub fn banknote(config: Option<&ServiceConfig>, scorer: Arc<dyn Scorer<ImagePayload>>) -> InferenceResult<Self> {
        Self::from_config(BANKNOTE, BANKNOTE_CLASSES, banknote_class_map(), config, scorer)
    }

    pub fn threshold(&self) -> &Threshold {
        self.classifier.threshold()
    }
}

impl InferenceService for ClassifierService {
    fn name(&self) -> &str {
        self.classifier.name()
    }

    fn predict(&self, payload: &Payload) -> InferenceResult<Prediction> {
        let image = ImagePayload::from_payload(payload, self.name())?;
        let outcome = self
            .classifier
            .classify_with(self.scorer.as_ref(), &image)
            .map_err(|e| retag_unreadable(e, self.name()))?;
        Ok(outcome.into())
    }
}
