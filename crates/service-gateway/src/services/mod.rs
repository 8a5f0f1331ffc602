//! Concrete inference services
//!
//! Each service validates its own payload and reports bad input as a domain
//! error tagged with its name.

mod classifier;
mod color;
mod object_detection;
mod ocr;

pub use classifier::{banknote_class_map, ClassifierService, BANKNOTE, BANKNOTE_CLASSES};
pub use color::{ColorService, DetailedColorService, COLOR, DETAILED_COLOR};
pub use object_detection::{ObjectDetectionService, DETECTION_THRESHOLD, OBJECT_DETECTION};
pub use ocr::{OcrService, OCR};
