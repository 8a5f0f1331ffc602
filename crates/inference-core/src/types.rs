use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Literal reported to callers when a prediction is demoted.
pub const BACKGROUND_LABEL: &str = "bg";

/// Kind-specific request fields. Opaque to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field, `None` when absent or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Decoded inbound request: `{"request": <kind>, ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "request")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Request {
    pub fn new(kind: impl Into<String>, payload: Payload) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// What a service reports for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: Option<f64>,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence: Some(confidence),
        }
    }

    /// A prediction without a meaningful score (e.g. recognized text).
    pub fn unscored(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: None,
        }
    }
}

/// Label chosen by a thresholded classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// The model's top class passed its threshold
    Predicted(String),
    /// No class met the confidence bar
    Background,
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Predicted(name) => name,
            Label::Background => BACKGROUND_LABEL,
        }
    }

    pub fn is_background(&self) -> bool {
        matches!(self, Label::Background)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one thresholded classification.
///
/// `confidence` is always the model's score for its top class, even when the
/// label was demoted to [`Label::Background`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub label: Label,
    pub confidence: f64,
}

impl ClassificationOutcome {
    pub fn predicted_label(&self) -> &str {
        self.label.as_str()
    }
}

impl From<ClassificationOutcome> for Prediction {
    fn from(outcome: ClassificationOutcome) -> Self {
        Prediction {
            label: outcome.label.to_string(),
            confidence: Some(outcome.confidence),
        }
    }
}

/// Uniform response envelope handed to the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok {
        response: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f64>,
        time: DateTime<Utc>,
    },
    Error {
        error_origin: String,
        error_message: String,
        time: DateTime<Utc>,
    },
}

impl Response {
    pub fn ok(prediction: Prediction) -> Self {
        Response::Ok {
            response: prediction.label,
            confidence: prediction.confidence,
            time: Utc::now(),
        }
    }

    pub fn error(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Response::Error {
            error_origin: origin.into(),
            error_message: message.into(),
            time: Utc::now(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Response::Ok { .. } => "ok",
            Response::Error { .. } => "error",
        }
    }
}
