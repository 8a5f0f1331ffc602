//! Inference service gateway
//!
//! Routes `{"request": <kind>, ...}` messages to the registered inference
//! services and wraps their answers in the response envelope. Also hosts the
//! drivers that calibrate a service's background threshold against labeled
//! data.

pub mod backends;
pub mod calibration;
pub mod config;
pub mod dispatcher;
pub mod image;
pub mod logging;
pub mod registry;
pub mod services;


pub use backends::{BoundingBox, ColorClassifier, Detection, ObjectDetector, TextRecognizer};
pub use config::{GatewayConfig, ServiceConfig};
pub use dispatcher::Dispatcher;
pub use image::ImagePayload;
pub use registry::{ServiceRegistry, ServiceRegistryBuilder};

use inference_core::InferenceResult;
use std::sync::Arc;
use threshold_classifier::Scorer;

use services::{ClassifierService, ColorService, DetailedColorService, ObjectDetectionService, OcrService, BANKNOTE};

/// Model backends behind the standard services
#[derive(Clone)]
pub struct GatewayBackends {
    pub banknote: Arc<dyn Scorer<ImagePayload>>,
    pub text: Arc<dyn TextRecognizer>,
    pub detector: Arc<dyn ObjectDetector>,
    pub color: Arc<dyn ColorClassifier>,
    pub detailed_color: Arc<dyn ColorClassifier>,
}

/// Registry with the banknote, ocr, object_detection, color and
/// detailed_color services.
pub fn standard_registry(config: &GatewayConfig, backends: GatewayBackends) -> InferenceResult<ServiceRegistry> {
    let banknote = ClassifierService::banknote(config.service(BANKNOTE), backends.banknote)?;

    ServiceRegistry::builder()
        .register(Arc::new(banknote))
        .register(Arc::new(OcrService::new(backends.text)))
        .register(Arc::new(ObjectDetectionService::new(backends.detector.clone())))
        .register(Arc::new(ColorService::new(backends.detector, backends.color)))
        .register(Arc::new(DetailedColorService::new(backends.detailed_color)))
        .build()
}

pub fn standard_dispatcher(config: &GatewayConfig, backends: GatewayBackends) -> InferenceResult<Dispatcher> {
    let registry = standard_registry(config, backends)?;
    tracing::info!(services = ?registry.names(), "Gateway ready");
    Ok(Dispatcher::new(registry))
}
