//! Calibration drivers
//!
//! Run labeled payloads through a [`Dispatcher`] and turn the responses into
//! input for the calibration engine. Collection for calibration expects the
//! service to be configured without a threshold, so every response carries
//! the raw top-class confidence.

use confidence_calibrator::{BackgroundPerformance, CalibrationSamples, PredictionDistribution};
use inference_core::{InferenceError, InferenceResult, Payload, Request, Response};
use std::collections::BTreeMap;
use threshold_classifier::Threshold;

use crate::config::GatewayConfig;
use crate::dispatcher::Dispatcher;

/// A request payload with its known class
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPayload {
    pub actual: String,
    pub payload: Payload,
}

impl LabeledPayload {
    pub fn new(actual: impl Into<String>, payload: Payload) -> Self {
        Self {
            actual: actual.into(),
            payload,
        }
    }
}

/// Confidences grouped by actual class, plus the error responses met on the
/// way (`"<class> #<index>: <message>"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassConfidences {
    pub confidences: BTreeMap<String, Vec<f64>>,
    pub errors: Vec<String>,
}

fn scored_response(kind: &str, index: usize, sample: &LabeledPayload, response: Response) -> InferenceResult<(String, f64)> {
    match response {
        Response::Ok {
            response,
            confidence: Some(confidence),
            ..
        } => Ok((response, confidence)),
        Response::Ok { .. } => Err(InferenceError::Calibration(format!(
            "{kind} returned no confidence for {} #{index}",
            sample.actual
        ))),
        Response::Error {
            error_origin,
            error_message,
            ..
        } => Err(InferenceError::Calibration(format!(
            "{} #{index} rejected by {error_origin}: {error_message}",
            sample.actual
        ))),
    }
}

/// Samples of all labeled payloads, pooled into one run.
///
/// An error response aborts collection.
pub fn collect_samples(dispatcher: &Dispatcher, kind: &str, labeled: &[LabeledPayload]) -> InferenceResult<CalibrationSamples> {
    let mut samples = CalibrationSamples::new();
    for (index, sample) in labeled.iter().enumerate() {
        let response = dispatcher.handle(&Request::new(kind, sample.payload.clone()))?;
        let (predicted, confidence) = scored_response(kind, index, sample, response)?;
        samples.record(&predicted, &sample.actual, confidence);
    }

    tracing::info!(
        service = kind,
        true_positives = samples.true_positives().len(),
        false_positives = samples.false_positives().len(),
        "Calibration samples collected"
    );
    Ok(samples)
}

/// Samples split by actual class, one calibration run per class.
pub fn collect_samples_per_class(
    dispatcher: &Dispatcher,
    kind: &str,
    labeled: &[LabeledPayload],
) -> InferenceResult<BTreeMap<String, CalibrationSamples>> {
    let mut per_class: BTreeMap<String, CalibrationSamples> = BTreeMap::new();
    for (index, sample) in labeled.iter().enumerate() {
        let response = dispatcher.handle(&Request::new(kind, sample.payload.clone()))?;
        let (predicted, confidence) = scored_response(kind, index, sample, response)?;
        per_class
            .entry(sample.actual.clone())
            .or_default()
            .record(&predicted, &sample.actual, confidence);
    }

    tracing::info!(service = kind, classes = per_class.len(), "Per-class calibration samples collected");
    Ok(per_class)
}

/// Confidences of successful responses by actual class. Error responses are
/// gathered rather than aborting.
pub fn collect_confidences_by_class(
    dispatcher: &Dispatcher,
    kind: &str,
    labeled: &[LabeledPayload],
) -> InferenceResult<ClassConfidences> {
    let mut collected = ClassConfidences::default();
    for (index, sample) in labeled.iter().enumerate() {
        let entry = collected.confidences.entry(sample.actual.clone()).or_default();
        match dispatcher.handle(&Request::new(kind, sample.payload.clone()))? {
            Response::Ok {
                confidence: Some(confidence),
                ..
            } => entry.push(confidence),
            Response::Ok { .. } => {}
            Response::Error { error_message, .. } => {
                collected.errors.push(format!("{} #{index}: {error_message}", sample.actual));
            }
        }
    }

    if !collected.errors.is_empty() {
        tracing::warn!(service = kind, errors = collected.errors.len(), "Error responses during collection");
    }
    Ok(collected)
}

/// How predictions for the samples of `class` spread over labels. Samples of
/// other classes are skipped; an error response aborts collection.
pub fn collect_prediction_distribution(
    dispatcher: &Dispatcher,
    kind: &str,
    class: &str,
    labeled: &[LabeledPayload],
) -> InferenceResult<PredictionDistribution> {
    let mut distribution = PredictionDistribution::new(class);
    for (index, sample) in labeled.iter().enumerate().filter(|(_, s)| s.actual == class) {
        let response = dispatcher.handle(&Request::new(kind, sample.payload.clone()))?;
        let (predicted, confidence) = scored_response(kind, index, sample, response)?;
        distribution.record(&predicted, confidence);
    }

    tracing::info!(
        service = kind,
        class,
        samples = distribution.total(),
        labels = distribution.predictions.len(),
        "Prediction distribution collected"
    );
    Ok(distribution)
}

/// Tally responses of a thresholded service against the known classes.
pub fn evaluate_background(dispatcher: &Dispatcher, kind: &str, labeled: &[LabeledPayload]) -> InferenceResult<BackgroundPerformance> {
    let mut performance = BackgroundPerformance::new();
    for sample in labeled {
        let response = dispatcher.handle(&Request::new(kind, sample.payload.clone()))?;
        let label = match &response {
            Response::Ok { response, .. } => Some(response.as_str()),
            Response::Error { .. } => None,
        };
        performance.record_response(&sample.actual, label);
    }

    let overall = performance.overall();
    tracing::info!(
        service = kind,
        correct_pct = overall.correct_pct(),
        background_pct = overall.background_pct(),
        "Background performance evaluated"
    );
    Ok(performance)
}

/// Fail unless `service` is configured with `expected`. A scalar expectation
/// also matches a per-class vector whose entries all equal it.
pub fn assert_threshold(config: &GatewayConfig, service: &str, expected: &Threshold) -> InferenceResult<()> {
    let configured = config
        .service(service)
        .and_then(|s| s.background_threshold.clone())
        .unwrap_or_default();

    let matches = match (&configured, expected) {
        (Threshold::PerClass(_), Threshold::Scalar(value)) => configured.is_uniform(*value),
        _ => &configured == expected,
    };
    if matches {
        Ok(())
    } else {
        Err(InferenceError::Calibration(format!(
            "{service} threshold is {configured:?}, expected {expected:?}"
        )))
    }
}
