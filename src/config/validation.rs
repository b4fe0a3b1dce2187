//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (primary endpoint exists, active network exists)
//! - Validate value ranges (thresholds, batch sizes, timeouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SenderConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{SenderConfig, MAX_BATCH_SIZE};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &SenderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.active_network().is_none() {
        errors.push(ValidationError::new(
            "network",
            format!("network '{}' is not defined under [networks]", config.network),
        ));
    }

    for (name, network) in &config.networks {
        let prefix = format!("networks.{}", name);

        if network.min_consensus == 0 {
            errors.push(ValidationError::new(
                format!("{}.min_consensus", prefix),
                "must be at least 1",
            ));
        }

        let mut seen = HashSet::new();
        for endpoint in &network.endpoints {
            if !seen.insert(endpoint.id.as_str()) {
                errors.push(ValidationError::new(
                    format!("{}.endpoints", prefix),
                    format!("duplicate endpoint id '{}'", endpoint.id),
                ));
            }
            if let Err(e) = endpoint.request_url() {
                errors.push(ValidationError::new(
                    format!("{}.endpoints.{}.url", prefix, endpoint.id),
                    format!("invalid URL: {}", e),
                ));
            }
        }

        if let Some(primary) = &network.primary_endpoint {
            if !network.endpoints.iter().any(|e| &e.id == primary) {
                errors.push(ValidationError::new(
                    format!("{}.primary_endpoint", prefix),
                    format!("unknown endpoint id '{}'", primary),
                ));
            }
        }
    }

    if config.batch.max_size == 0 || config.batch.max_size > MAX_BATCH_SIZE {
        errors.push(ValidationError::new(
            "batch.max_size",
            format!("must be within 1..={}", MAX_BATCH_SIZE),
        ));
    }
    if config.batch.default_size == 0 || config.batch.default_size > config.batch.max_size {
        errors.push(ValidationError::new(
            "batch.default_size",
            "must be within 1..=batch.max_size",
        ));
    }

    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        errors.push(ValidationError::new(
            "retry.base_delay_ms",
            "must not exceed retry.max_delay_ms",
        ));
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be positive"));
    }
    if config.rpc.poll_interval_ms == 0 {
        errors.push(ValidationError::new("rpc.poll_interval_ms", "must be positive"));
    }
    if config.consensus.query_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "consensus.query_timeout_secs",
            "must be positive",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
