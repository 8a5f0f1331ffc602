use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use threshold_classifier::Threshold;

use confidence_calibrator::DEFAULT_STEP;

const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Per-service section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Scalar (`0.65`) or per-class (`[0.7, 0.6, ...]`) background threshold
    #[serde(default)]
    pub background_threshold: Option<Threshold>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub config_path: PathBuf,
    /// Grid step for calibration runs
    pub calibration_step: f64,
    pub services: HashMap<String, ServiceConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            calibration_step: DEFAULT_STEP,
            services: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_path = lookup("INFERENCE_CONFIG_PATH").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let calibration_step: f64 = lookup("CALIBRATION_STEP")
            .unwrap_or_else(|| DEFAULT_STEP.to_string())
            .parse()
            .context("CALIBRATION_STEP must be a number")?;

        Self::load(config_path, calibration_step)
    }

    /// Read the service sections from `path`. A missing file means every
    /// service runs with its defaults.
    pub fn load(path: impl AsRef<Path>, calibration_step: f64) -> Result<Self> {
        let path = path.as_ref();
        let services = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::info!(path = %path.display(), "No config file, using service defaults");
            HashMap::new()
        };

        tracing::info!(
            path = %path.display(),
            services = services.len(),
            calibration_step,
            "Configuration loaded"
        );

        Ok(Self {
            config_path: path.to_path_buf(),
            calibration_step,
            services,
        })
    }

    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.get(name)
    }

    pub fn with_service(mut self, name: impl Into<String>, config: ServiceConfig) -> Self {
        self.services.insert(name.into(), config);
        self
    }
}
