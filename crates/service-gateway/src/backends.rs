//! Model backends
//!
//! Interfaces to the models behind each service. Implementations live outside
//! this crate (embedded runtimes, native bindings, remote workers); the
//! services only depend on these traits.
//!
//! A backend that cannot decode or read its input returns
//! [`InferenceError::UnreadableMedia`](inference_core::InferenceError::UnreadableMedia)
//! so the service can report it to the caller. Any other error is treated as
//! an operational failure.

use inference_core::InferenceResult;
use serde::{Deserialize, Serialize};

use crate::image::ImagePayload;

/// Normalized box, in `[ymin, xmin, ymax, xmax]` order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

/// One object found by a detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub name: String,
    pub score: f64,
    pub frame: BoundingBox,
}

pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &ImagePayload) -> InferenceResult<Vec<Detection>>;
}

pub trait TextRecognizer: Send + Sync {
    /// `language` is a recognizer-specific code (e.g. `tur`); `None` uses the
    /// recognizer's default.
    fn recognize(&self, image: &ImagePayload, language: Option<&str>) -> InferenceResult<String>;
}

pub trait ColorClassifier: Send + Sync {
    /// Color name of `region`, or of the whole image when `None`.
    fn classify(&self, image: &ImagePayload, region: Option<&BoundingBox>) -> InferenceResult<String>;
}
