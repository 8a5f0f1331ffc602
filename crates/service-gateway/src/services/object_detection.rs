//! Object detection service
//!
//! Summarizes a detector's output as a sentence such as
//! `"2 people, 1 kite and 3 cars"`, with the mean score of the reported
//! detections as confidence.

use inference_core::{InferenceResult, InferenceService, Payload, Prediction};
use std::sync::Arc;

use crate::backends::{Detection, ObjectDetector};
use crate::image::{retag_unreadable, ImagePayload};

pub const OBJECT_DETECTION: &str = "object_detection";

/// Detections at or below this score are dropped
pub const DETECTION_THRESHOLD: f64 = 0.5;

const NOTHING: &str = "nothing";

pub struct ObjectDetectionService {
    detector: Arc<dyn ObjectDetector>,
}

impl ObjectDetectionService {
    pub fn new(detector: Arc<dyn ObjectDetector>) -> Self {
        tracing::info!(service = OBJECT_DETECTION, "Initiating new service");
        Self { detector }
    }

    /// Detections scoring above [`DETECTION_THRESHOLD`], in detector order.
    pub fn approved_detections(&self, image: &ImagePayload) -> InferenceResult<Vec<Detection>> {
        let detections = self
            .detector
            .detect(image)
            .map_err(|e| retag_unreadable(e, OBJECT_DETECTION))?;
        Ok(detections
            .into_iter()
            .filter(|d| d.score > DETECTION_THRESHOLD)
            .collect())
    }
}

impl InferenceService for ObjectDetectionService {
    fn name(&self) -> &str {
        OBJECT_DETECTION
    }

    fn predict(&self, payload: &Payload) -> InferenceResult<Prediction> {
        let image = ImagePayload::from_payload(payload, OBJECT_DETECTION)?;
        let detections = self.approved_detections(&image)?;

        let confidence = if detections.is_empty() {
            0.0
        } else {
            detections.iter().map(|d| d.score).sum::<f64>() / detections.len() as f64
        };
        Ok(Prediction::new(summarize(&detections), confidence))
    }
}

/// Count detections per name, keeping first-seen order.
fn count_by_name(detections: &[Detection]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for detection in detections {
        match counts.iter_mut().find(|(name, _)| *name == detection.name) {
            Some((_, count)) => *count += 1,
            None => counts.push((&detection.name, 1)),
        }
    }
    counts
}

fn summarize(detections: &[Detection]) -> String {
    let parts: Vec<String> = count_by_name(detections)
        .into_iter()
        .map(|(name, count)| {
            if count > 1 {
                format!("{count} {}", pluralize(name))
            } else {
                format!("{count} {}", singular(name))
            }
        })
        .collect();

    match parts.as_slice() {
        [] => NOTHING.to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Display name of a single detected object.
fn singular(name: &str) -> &str {
    match name {
        "skis" => "pair of skis",
        other => other,
    }
}

/// English plural of a detector class name.
fn pluralize(name: &str) -> String {
    const IRREGULAR: &[(&str, &str)] = &[
        ("person", "people"),
        ("mouse", "mice"),
        ("sheep", "sheep"),
        ("knife", "knives"),
        ("skis", "pairs of skis"),
        ("scissors", "scissors"),
    ];

    // Multi-word names ("traffic light") pluralize their last word.
    let (head, last) = match name.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, name),
    };

    let plural = if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == last) {
        plural.to_string()
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| last.ends_with(suffix)) {
        format!("{last}es")
    } else if last.ends_with('y') && !last.ends_with("ay") && !last.ends_with("ey") && !last.ends_with("oy") {
        format!("{}ies", &last[..last.len() - 1])
    } else {
        format!("{last}s")
    };

    match head {
        Some(head) => format!("{head} {plural}"),
        None => plural,
    }
}
