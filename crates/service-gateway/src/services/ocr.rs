use inference_core::{InferenceResult, InferenceService, Payload, Prediction};
use std::sync::Arc;

use crate::backends::TextRecognizer;
use crate::image::{retag_unreadable, ImagePayload};

pub const OCR: &str = "ocr";
const LANGUAGE_FIELD: &str = "language";

/// Optical character recognition. Responds with the recognized text and no
/// confidence.
pub struct OcrService {
    recognizer: Arc<dyn TextRecognizer>,
}

impl OcrService {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        tracing::info!(service = OCR, "Initiating new service");
        Self { recognizer }
    }
}

impl InferenceService for OcrService {
    fn name(&self) -> &str {
        OCR
    }

    fn predict(&self, payload: &Payload) -> InferenceResult<Prediction> {
        let image = ImagePayload::from_payload(payload, OCR)?;
        let language = payload.str_field(LANGUAGE_FIELD).filter(|l| !l.is_empty());
        let text = self
            .recognizer
            .recognize(&image, language)
            .map_err(|e| retag_unreadable(e, OCR))?;
        Ok(Prediction::unscored(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoLanguage;

    impl TextRecognizer for EchoLanguage {
        fn recognize(&self, _image: &ImagePayload, language: Option<&str>) -> InferenceResult<String> {
            Ok(format!("text in {}", language.unwrap_or("eng")))
        }
    }

    #[test]
    fn test_language_passed_through() {
        let service = OcrService::new(Arc::new(EchoLanguage));
        let payload = Payload::new()
            .with("image", "data:image/png;base64,iVBOR")
            .with("language", "tur");

        let prediction = service.predict(&payload).unwrap();
        assert_eq!(prediction, Prediction::unscored("text in tur"));
    }

    #[test]
    fn test_default_language() {
        let service = OcrService::new(Arc::new(EchoLanguage));
        let payload = Payload::new().with("image", "data:image/png;base64,iVBOR");
        assert_eq!(service.predict(&payload).unwrap().label, "text in eng");
    }

    #[test]
    fn test_invalid_image() {
        let service = OcrService::new(Arc::new(EchoLanguage));
        let err = service.predict(&Payload::new().with("image", "hello")).unwrap_err();
        assert_eq!(err.envelope_parts(), Some(("ocr", "Invalid image format".to_string())));
    }
}
