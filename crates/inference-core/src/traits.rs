use crate::{InferenceResult, Payload, Prediction};

/// A named service the dispatcher can route requests to.
///
/// Implementations are built once at startup and shared across calls, so
/// `predict` must not rely on per-call mutation.
pub trait InferenceService: Send + Sync {
    /// Registry key, also used as the origin tag of the service's errors.
    fn name(&self) -> &str;

    /// Runs inference on the kind-specific request fields.
    ///
    /// Domain failures (bad payload, unreadable media) are returned as
    /// [`crate::InferenceError::DomainInput`]; anything else is treated as an
    /// operational failure by the caller.
    fn predict(&self, payload: &Payload) -> InferenceResult<Prediction>;
}
