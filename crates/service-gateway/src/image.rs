use inference_core::{InferenceError, InferenceResult, Payload};

const IMAGE_FIELD: &str = "image";
const DATA_PREFIX: &str = "data:image";
const BASE64_MARKER: &str = ";base64,";

/// Image carried by a request, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Subtype from the data URI (`png` in `data:image/png;base64,...`)
    pub media_type: Option<String>,
    /// Encoded image body
    pub data: String,
}

impl ImagePayload {
    /// Extract the `image` field of a request.
    ///
    /// Errors are domain errors tagged with `service`.
    pub fn from_payload(payload: &Payload, service: &str) -> InferenceResult<Self> {
        let raw = match payload.str_field(IMAGE_FIELD) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(InferenceError::domain(service, "No image")),
        };
        Self::parse_data_uri(raw).ok_or_else(|| InferenceError::domain(service, "Invalid image format"))
    }

    /// Accepts `data:image[/<subtype>];base64,<data>` with non-empty data and
    /// at most one trailing newline.
    fn parse_data_uri(raw: &str) -> Option<Self> {
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        let rest = raw.strip_prefix(DATA_PREFIX)?;
        let (media, data) = rest.split_once(BASE64_MARKER)?;
        if data.is_empty() || data.contains('\n') {
            return None;
        }
        let media_type = match media {
            "" => None,
            m => Some(m.strip_prefix('/')?.to_string()),
        };
        Some(Self {
            media_type,
            data: data.to_string(),
        })
    }
}

/// Map a backend's "cannot read this input" into the service's domain error.
pub(crate) fn retag_unreadable(err: InferenceError, service: &str) -> InferenceError {
    match err {
        InferenceError::UnreadableMedia(reason) => {
            tracing::warn!(service, %reason, "Could not load image data");
            InferenceError::domain(service, "Could not load image data")
        }
        other => other,
    }
}
