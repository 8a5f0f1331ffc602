//! Request dispatch
//!
//! Single entry point from the transport layer. Every request ends in a
//! [`Response`] envelope unless the invoked service fails operationally
//! (scorer crash, model/config mismatch), in which case the error is returned
//! as-is so it stays visible.

use inference_core::{InferenceError, InferenceResult, Request, Response};

use crate::registry::ServiceRegistry;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ServiceRegistry,
}

impl Dispatcher {
    pub fn new(registry: ServiceRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn handle(&self, request: &Request) -> InferenceResult<Response> {
        let result = match self.registry.get(&request.kind) {
            Some(service) => {
                tracing::debug!(service = %request.kind, "Dispatching request");
                service.predict(&request.payload)
            }
            None => Err(InferenceError::UnknownService(request.kind.clone())),
        };

        match result {
            Ok(prediction) => Ok(Response::ok(prediction)),
            Err(err) => match err.envelope_parts() {
                Some((origin, message)) => {
                    tracing::warn!(service = %request.kind, origin, %message, "Request rejected");
                    Ok(Response::error(origin, message))
                }
                None => {
                    tracing::error!(service = %request.kind, error = %err, "Service failed");
                    Err(err)
                }
            },
        }
    }

    /// Decode a wire request, dispatch it and encode the response.
    pub fn handle_json(&self, raw: &str) -> InferenceResult<String> {
        let request: Request = serde_json::from_str(raw)?;
        let response = self.handle(&request)?;
        serde_json::to_string(&response).map_err(InferenceError::from)
    }
}
