use inference_core::{InferenceResult, InferenceService, Payload, Prediction};
use std::sync::Arc;

use super::object_detection::DETECTION_THRESHOLD;
use crate::backends::{ColorClassifier, ObjectDetector};
use crate::image::{retag_unreadable, ImagePayload};

pub const COLOR: &str = "color";
pub const DETAILED_COLOR: &str = "detailed_color";

/// Color answers are not scored by the classifier.
const COLOR_CONFIDENCE: f64 = 1.0;

/// Names the color of each detected object ("red car, blue person"), or of
/// the whole image when nothing is detected.
pub struct ColorService {
    detector: Arc<dyn ObjectDetector>,
    classifier: Arc<dyn ColorClassifier>,
}

impl ColorService {
    pub fn new(detector: Arc<dyn ObjectDetector>, classifier: Arc<dyn ColorClassifier>) -> Self {
        tracing::info!(service = COLOR, "Initiating new service");
        Self { detector, classifier }
    }

    fn describe(&self, image: &ImagePayload) -> InferenceResult<String> {
        let detections = self.detector.detect(image)?;
        let mut parts = Vec::new();
        for detection in detections.iter().filter(|d| d.score > DETECTION_THRESHOLD) {
            let color = self.classifier.classify(image, Some(&detection.frame))?;
            parts.push(format!("{color} {}", detection.name));
        }

        if parts.is_empty() {
            return self.classifier.classify(image, None);
        }
        Ok(parts.join(", "))
    }
}

impl InferenceService for ColorService {
    fn name(&self) -> &str {
        COLOR
    }

    fn predict(&self, payload: &Payload) -> InferenceResult<Prediction> {
        let image = ImagePayload::from_payload(payload, COLOR)?;
        let description = self.describe(&image).map_err(|e| retag_unreadable(e, COLOR))?;
        Ok(Prediction::new(description, COLOR_CONFIDENCE))
    }
}

/// Dominant color of the whole image from a fine-grained palette.
pub struct DetailedColorService {
    classifier: Arc<dyn ColorClassifier>,
}

impl DetailedColorService {
    pub fn new(classifier: Arc<dyn ColorClassifier>) -> Self {
        tracing::info!(service = DETAILED_COLOR, "Initiating new service");
        Self { classifier }
    }
}

impl InferenceService for DetailedColorService {
    fn name(&self) -> &str {
        DETAILED_COLOR
    }

    fn predict(&self, payload: &Payload) -> InferenceResult<Prediction> {
        let image = ImagePayload::from_payload(payload, DETAILED_COLOR)?;
        let color = self
            .classifier
            .classify(&image, None)
            .map_err(|e| retag_unreadable(e, DETAILED_COLOR))?;
        Ok(Prediction::new(color, COLOR_CONFIDENCE))
    }
}
