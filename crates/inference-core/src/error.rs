use thiserror::Error;

/// Origin tag of errors raised by the dispatcher itself
pub const SERVER_ORIGIN: &str = "server";
pub const UNKNOWN_SERVICE_MESSAGE: &str = "Unknown service";

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// A request-shape problem raised by a service, reported back to the caller.
    #[error("{message}")]
    DomainInput { origin: String, message: String },

    /// The model chose an output index the class map has no name for.
    #[error("Unexpected class index {index} from model [{service}]")]
    UnexpectedClass { service: String, index: usize },

    #[error("Invalid threshold config: {0}")]
    InvalidThresholdConfig(String),

    #[error("Insufficient calibration data: {0}")]
    InsufficientCalibrationData(String),

    #[error("Invalid calibration config: {0}")]
    InvalidCalibrationConfig(String),

    #[error("Score vector has {actual} entries, expected {expected}")]
    ScoreDimension { expected: usize, actual: usize },

    #[error("Unreadable media: {0}")]
    UnreadableMedia(String),

    #[error("Backend failure: {0}")]
    Backend(String),

    #[error("Service registered twice: {0}")]
    DuplicateService(String),

    #[error("Calibration aborted: {0}")]
    Calibration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InferenceError {
    /// Shorthand for a domain error tagged with the service that raised it.
    pub fn domain(origin: impl Into<String>, message: impl Into<String>) -> Self {
        InferenceError::DomainInput {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Whether this error is turned into an error envelope instead of
    /// aborting the call.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            InferenceError::UnknownService(_) | InferenceError::DomainInput { .. }
        )
    }

    /// Origin tag and message for an error envelope, if this error has one.
    pub fn envelope_parts(&self) -> Option<(&str, String)> {
        match self {
            InferenceError::UnknownService(_) => Some((SERVER_ORIGIN, UNKNOWN_SERVICE_MESSAGE.to_string())),
            InferenceError::DomainInput { origin, message } => Some((origin, message.clone())),
            _ => None,
        }
    }
}

pub type InferenceResult<T> = Result<T, InferenceError>;
