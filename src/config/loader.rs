//! Configuration loader for the DIS ingest SDK
//!
//! This module handles loading configuration from YAML files and environment variables.

use crate::config::{DisConfiguration, LoggingConfig};
use crate::error::DisError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// YAML configuration structure (for deserialization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigYaml {
    pub endpoint: Option<String>,
    pub manager_endpoint: Option<String>,
    pub region: Option<String>,
    pub project_id: Option<String>,
    pub security_token: Option<String>,
    pub records_retries: Option<u32>,
    pub backoff: Option<BackoffYaml>,
    pub encryption: Option<EncryptionYaml>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffYaml {
    pub initial_interval_ms: Option<u64>,
    pub multiplier: Option<f64>,
    pub max_interval_ms: Option<u64>,
    pub max_elapsed_ms: Option<u64>,
    pub jitter: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionYaml {
    pub enabled: Option<bool>,
    pub data_password: Option<String>,
}

/// Load configuration from YAML file
///
/// # Arguments
///
/// * `path` - Path to YAML configuration file
///
/// # Returns
///
/// Returns a validated `DisConfiguration`, or `DisError` if loading fails.
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<DisConfiguration, DisError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        DisError::ConfigurationError(format!(
            "Failed to read config file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;

    let yaml: ConfigYaml = serde_yaml::from_str(&content)
        .map_err(|e| DisError::ConfigurationError(format!("Failed to parse YAML: {}", e)))?;

    let mut config = DisConfiguration::new(
        yaml.endpoint
            .ok_or_else(|| DisError::ConfigurationError("endpoint is required".to_string()))?,
        yaml.region
            .ok_or_else(|| DisError::ConfigurationError("region is required".to_string()))?,
        yaml.project_id
            .ok_or_else(|| DisError::ConfigurationError("project_id is required".to_string()))?,
    );

    if let Some(manager) = yaml.manager_endpoint {
        config = config.with_manager_endpoint(manager);
    }

    if let Some(token) = yaml.security_token {
        config = config.with_security_token(token);
    }

    if let Some(retries) = yaml.records_retries {
        config = config.with_records_retries(retries);
    }

    if let Some(backoff) = yaml.backoff {
        let initial = backoff
            .initial_interval_ms
            .unwrap_or(config.backoff_initial_interval_ms);
        let multiplier = backoff.multiplier.unwrap_or(config.backoff_multiplier);
        let max = backoff
            .max_interval_ms
            .unwrap_or(config.backoff_max_interval_ms);
        config = config.with_backoff(initial, multiplier, max);
        config = config
            .with_backoff_max_elapsed_ms(backoff.max_elapsed_ms)
            .with_backoff_jitter(backoff.jitter.unwrap_or(false));
    }

    if let Some(encryption) = yaml.encryption {
        if encryption.enabled.unwrap_or(false) {
            config = config.with_data_encryption(encryption.data_password.unwrap_or_default());
        }
    }

    if let Some(logging) = yaml.logging {
        config = config.with_logging(logging);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Reads the following variables:
/// - `DIS_ENDPOINT`, `DIS_REGION`, `DIS_PROJECT_ID` (required)
/// - `DIS_MANAGER_ENDPOINT`, `DIS_SECURITY_TOKEN`
/// - `DIS_RECORDS_RETRIES`
/// - `DIS_BACKOFF_INITIAL_INTERVAL_MS`, `DIS_BACKOFF_MULTIPLIER`,
///   `DIS_BACKOFF_MAX_INTERVAL_MS`, `DIS_BACKOFF_MAX_ELAPSED_MS`, `DIS_BACKOFF_JITTER`
/// - `DIS_DATA_ENCRYPT_ENABLED`, `DIS_DATA_PASSWORD`
/// - `DIS_LOG_LEVEL`, `DIS_LOG_JSON`
///
/// Unset optional variables keep their defaults.
///
/// # Errors
///
/// Returns `ConfigurationError` if a required variable is missing, a numeric
/// variable does not parse, or the resulting configuration is invalid.
pub fn load_from_env() -> Result<DisConfiguration, DisError> {
    let required = |name: &str| {
        std::env::var(name).map_err(|_| {
            DisError::ConfigurationError(format!("{} environment variable is required", name))
        })
    };

    let mut config = DisConfiguration::new(
        required("DIS_ENDPOINT")?,
        required("DIS_REGION")?,
        required("DIS_PROJECT_ID")?,
    );

    if let Ok(manager) = std::env::var("DIS_MANAGER_ENDPOINT") {
        config = config.with_manager_endpoint(manager);
    }

    if let Ok(token) = std::env::var("DIS_SECURITY_TOKEN") {
        config = config.with_security_token(token);
    }

    if let Some(retries) = parse_env::<u32>("DIS_RECORDS_RETRIES")? {
        config = config.with_records_retries(retries);
    }

    let initial =
        parse_env("DIS_BACKOFF_INITIAL_INTERVAL_MS")?.unwrap_or(config.backoff_initial_interval_ms);
    let multiplier = parse_env("DIS_BACKOFF_MULTIPLIER")?.unwrap_or(config.backoff_multiplier);
    let max = parse_env("DIS_BACKOFF_MAX_INTERVAL_MS")?.unwrap_or(config.backoff_max_interval_ms);
    config = config
        .with_backoff(initial, multiplier, max)
        .with_backoff_max_elapsed_ms(parse_env("DIS_BACKOFF_MAX_ELAPSED_MS")?)
        .with_backoff_jitter(std::env::var("DIS_BACKOFF_JITTER").unwrap_or_default() == "true");

    if std::env::var("DIS_DATA_ENCRYPT_ENABLED").unwrap_or_default() == "true" {
        config =
            config.with_data_encryption(std::env::var("DIS_DATA_PASSWORD").unwrap_or_default());
    }

    config = config.with_logging(LoggingConfig {
        log_level: std::env::var("DIS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        json: std::env::var("DIS_LOG_JSON").unwrap_or_default() == "true",
    });

    config.validate()?;
    Ok(config)
}

fn parse_env<T>(name: &str) -> Result<Option<T>, DisError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|e| {
            DisError::ConfigurationError(format!("{} has invalid value '{}': {}", name, value, e))
        }),
        Err(_) => Ok(None),
    }
}
