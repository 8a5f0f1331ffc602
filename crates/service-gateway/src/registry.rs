use inference_core::{InferenceError, InferenceResult, InferenceService};
use std::collections::HashMap;
use std::sync::Arc;

/// Services by name. Built once at startup, read-only afterwards.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<dyn InferenceService>>,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn InferenceService>> {
        self.services.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.services.contains_key(kind)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}

#[derive(Default)]
pub struct ServiceRegistryBuilder {
    services: Vec<Arc<dyn InferenceService>>,
}

impl ServiceRegistryBuilder {
    pub fn register(mut self, service: Arc<dyn InferenceService>) -> Self {
        self.services.push(service);
        self
    }

    /// Fails if two services share a name.
    pub fn build(self) -> InferenceResult<ServiceRegistry> {
        let mut services = HashMap::with_capacity(self.services.len());
        for service in self.services {
            let name = service.name().to_string();
            if services.contains_key(&name) {
                return Err(InferenceError::DuplicateService(name));
            }
            tracing::info!(service = %name, "Service registered");
            services.insert(name, service);
        }
        Ok(ServiceRegistry { services })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_core::{Payload, Prediction};

    struct Echo(&'static str);

    impl InferenceService for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn predict(&self, _payload: &Payload) -> InferenceResult<Prediction> {
            Ok(Prediction::new(self.0, 1.0))
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let registry = ServiceRegistry::builder()
            .register(Arc::new(Echo("ocr")))
            .register(Arc::new(Echo("banknote")))
            .build()
            .unwrap();

        assert_eq!(registry.names(), vec!["banknote", "ocr"]);
        assert!(registry.contains("ocr"));
        assert!(registry.get("color").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = ServiceRegistry::builder()
            .register(Arc::new(Echo("ocr")))
            .register(Arc::new(Echo("ocr")))
            .build()
            .unwrap_err();
        assert!(matches!(err, InferenceError::DuplicateService(name) if name == "ocr"));
    }
}
