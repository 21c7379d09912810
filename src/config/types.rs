//! Configuration types for the DIS ingest SDK
//!
//! This module defines the configuration structures and validation logic.

use crate::error::DisError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::client::backoff::BackoffPolicy;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration
///
/// Consumed by [`crate::observability::init_tracing`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level filter for tracing (e.g., "info", "debug", "warn", "error")
    /// Default: "info"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON lines instead of human readable output (default: false)
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Validate the logging configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `log_level` is not a valid log level.
    pub fn validate(&self) -> Result<(), DisError> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(DisError::ConfigurationError(format!(
                "log_level must be one of {:?}, got: '{}'",
                VALID_LOG_LEVELS, self.log_level
            )));
        }
        Ok(())
    }
}

/// Complete configuration for a [`crate::DisClient`]
///
/// Represents everything needed to reach the service: endpoints, project scope,
/// the batch-write retry profile and payload encryption settings.
#[derive(Debug, Clone)]
pub struct DisConfiguration {
    /// Data plane endpoint URL (required), used for records and cursors
    pub endpoint: String,
    /// Management endpoint URL for stream and transfer task operations
    ///
    /// Falls back to `endpoint` when not set.
    pub manager_endpoint: Option<String>,
    /// Region name (required)
    pub region: String,
    /// Project ID, sent as `X-Project-Id` and embedded in every resource path (required)
    pub project_id: String,
    /// Temporary security token, sent as `X-Security-Token` when present
    pub security_token: Option<SecretString>,
    /// Maximum number of retries for records that failed in a batch write (default: 20)
    ///
    /// 0 disables retry: exactly one attempt is made.
    pub records_retries: u32,
    /// Initial backoff interval in milliseconds (default: 100)
    pub backoff_initial_interval_ms: u64,
    /// Multiplier applied to the backoff interval after each retry (default: 1.5)
    pub backoff_multiplier: f64,
    /// Maximum backoff interval in milliseconds (default: 30000)
    pub backoff_max_interval_ms: u64,
    /// Maximum total time spent backing off within one call (default: unbounded)
    pub backoff_max_elapsed_ms: Option<u64>,
    /// Randomize each sleep with full jitter (default: false)
    pub backoff_jitter: bool,
    /// Encrypt record payloads before upload and decrypt after download (default: false)
    pub data_encrypt_enabled: bool,
    /// Password the payload cipher derives its keys from
    pub data_password: Option<SecretString>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl DisConfiguration {
    /// Create a new configuration with defaults
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Data plane endpoint URL
    /// * `region` - Region name
    /// * `project_id` - Project ID
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dis_ingest_sdk::DisConfiguration;
    ///
    /// let config = DisConfiguration::new(
    ///     "https://dis.cn-north-1.myhuaweicloud.com".to_string(),
    ///     "cn-north-1".to_string(),
    ///     "my_project".to_string(),
    /// );
    /// ```
    pub fn new(endpoint: String, region: String, project_id: String) -> Self {
        Self {
            endpoint,
            manager_endpoint: None,
            region,
            project_id,
            security_token: None,
            records_retries: 20,
            backoff_initial_interval_ms: 100,
            backoff_multiplier: 1.5,
            backoff_max_interval_ms: 30000,
            backoff_max_elapsed_ms: None,
            backoff_jitter: false,
            data_encrypt_enabled: false,
            data_password: None,
            logging: LoggingConfig::default(),
        }
    }

    /// Set the management endpoint
    pub fn with_manager_endpoint(mut self, endpoint: String) -> Self {
        self.manager_endpoint = Some(endpoint);
        self
    }

    /// Set the security token
    pub fn with_security_token(mut self, token: String) -> Self {
        self.security_token = Some(SecretString::new(token));
        self
    }

    /// Set the batch-write retry ceiling
    pub fn with_records_retries(mut self, retries: u32) -> Self {
        self.records_retries = retries;
        self
    }

    /// Set the backoff profile
    ///
    /// # Arguments
    ///
    /// * `initial_interval_ms` - First sleep before a retry
    /// * `multiplier` - Growth factor between consecutive sleeps
    /// * `max_interval_ms` - Cap on a single sleep
    pub fn with_backoff(
        mut self,
        initial_interval_ms: u64,
        multiplier: f64,
        max_interval_ms: u64,
    ) -> Self {
        self.backoff_initial_interval_ms = initial_interval_ms;
        self.backoff_multiplier = multiplier;
        self.backoff_max_interval_ms = max_interval_ms;
        self
    }

    /// Bound the total time spent backing off within one call
    pub fn with_backoff_max_elapsed_ms(mut self, max_elapsed_ms: Option<u64>) -> Self {
        self.backoff_max_elapsed_ms = max_elapsed_ms;
        self
    }

    /// Enable or disable jitter on backoff sleeps
    pub fn with_backoff_jitter(mut self, jitter: bool) -> Self {
        self.backoff_jitter = jitter;
        self
    }

    /// Enable record payload encryption with the given password
    pub fn with_data_encryption(mut self, password: String) -> Self {
        self.data_encrypt_enabled = true;
        self.data_password = Some(SecretString::new(password));
        self
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Endpoint used for stream management operations
    pub fn effective_manager_endpoint(&self) -> &str {
        self.manager_endpoint.as_deref().unwrap_or(&self.endpoint)
    }

    /// Whether record payloads are encrypted
    ///
    /// Requires both the flag and a non-empty password.
    pub fn is_encryption_active(&self) -> bool {
        self.data_encrypt_enabled
            && self
                .data_password
                .as_ref()
                .map(|p| !p.expose_secret().is_empty())
                .unwrap_or(false)
    }

    /// Backoff policy described by this configuration
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            initial_interval: Duration::from_millis(self.backoff_initial_interval_ms),
            multiplier: self.backoff_multiplier,
            max_interval: Duration::from_millis(self.backoff_max_interval_ms),
            max_elapsed_time: self.backoff_max_elapsed_ms.map(Duration::from_millis),
            jitter: self.backoff_jitter,
        }
    }

    /// Validate configuration
    ///
    /// Checks that all required fields are present and valid.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `endpoint` or `manager_endpoint` is not a valid `http`/`https` URL
    /// - `region` or `project_id` is empty
    /// - the backoff profile is inconsistent
    /// - `data_encrypt_enabled` is true but no password is set
    /// - the log level is unknown
    pub fn validate(&self) -> Result<(), DisError> {
        validate_endpoint("endpoint", &self.endpoint)?;
        if let Some(manager) = &self.manager_endpoint {
            validate_endpoint("manager_endpoint", manager)?;
        }

        if self.region.trim().is_empty() {
            return Err(DisError::ConfigurationError(
                "region can not be empty".to_string(),
            ));
        }

        if self.project_id.trim().is_empty() {
            return Err(DisError::ConfigurationError(
                "project_id can not be empty".to_string(),
            ));
        }

        if self.backoff_initial_interval_ms == 0 {
            return Err(DisError::ConfigurationError(
                "backoff_initial_interval_ms must be > 0".to_string(),
            ));
        }

        if !(self.backoff_multiplier >= 1.0) {
            return Err(DisError::ConfigurationError(format!(
                "backoff_multiplier must be >= 1.0, got: {}",
                self.backoff_multiplier
            )));
        }

        if self.backoff_max_interval_ms < self.backoff_initial_interval_ms {
            return Err(DisError::ConfigurationError(format!(
                "backoff_max_interval_ms ({}) must be >= backoff_initial_interval_ms ({})",
                self.backoff_max_interval_ms, self.backoff_initial_interval_ms
            )));
        }

        if self.data_encrypt_enabled && !self.is_encryption_active() {
            return Err(DisError::ConfigurationError(
                "data_password is required when data_encrypt_enabled is true".to_string(),
            ));
        }

        self.logging.validate()
    }
}

fn validate_endpoint(field: &str, endpoint: &str) -> Result<(), DisError> {
    let parsed = Url::parse(endpoint.trim()).map_err(|e| {
        DisError::ConfigurationError(format!("{} is not a valid URL '{}': {}", field, endpoint, e))
    })?;

    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return Err(DisError::ConfigurationError(format!(
            "{} must start with 'https://' or 'http://', got: '{}'",
            field, endpoint
        )));
    }

    Ok(())
}
