//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (every label the table yields has an origin)
//! - Check prefix shape (non-empty, leading slash)
//! - Check timeouts are non-zero
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Overlapping prefixes are legal; first declared wins at runtime

use crate::config::loader::{
    DRUPAL_LATEST_URL, DRUPAL_LEGACY_URL, UPSTREAM_CONNECT_TIMEOUT_SECS, UPSTREAM_TIMEOUT_SECS,
};
use crate::config::schema::{ProxyConfig, TimeoutConfig};
use crate::routing::{OriginLabel, RouteTable};
use crate::upstream::OriginSet;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("rule {index}: prefix {prefix:?} must start with '/'")]
    InvalidPrefix { index: usize, prefix: String },

    #[error("shared path {index}: prefix {prefix:?} must start with '/'")]
    InvalidSharedPrefix { index: usize, prefix: String },

    #[error("{context} routes to {label}, but {var} is not configured")]
    MissingOrigin {
        context: String,
        label: OriginLabel,
        var: &'static str,
    },

    #[error("{var} must be at least 1 second")]
    ZeroTimeout { var: &'static str },
}

/// Validate a fully loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_table(&config.routing, &config.origins);
    errors.extend(validate_timeouts(&config.timeouts));
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a table against the configured origins.
pub fn validate_table(table: &RouteTable, origins: &OriginSet) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, rule) in table.rules.iter().enumerate() {
        if !is_valid_prefix(&rule.prefix) {
            errors.push(ValidationError::InvalidPrefix {
                index,
                prefix: rule.prefix.clone(),
            });
        }
        check_origin(&mut errors, origins, rule.origin, || {
            format!("rule {index} ({})", rule.prefix)
        });
    }

    for (index, prefix) in table.shared.iter().enumerate() {
        if !is_valid_prefix(prefix) {
            errors.push(ValidationError::InvalidSharedPrefix {
                index,
                prefix: prefix.clone(),
            });
        }
    }

    check_origin(&mut errors, origins, table.default, || "default".to_string());
    if let Some(home) = table.home {
        check_origin(&mut errors, origins, home, || "home page".to_string());
    }

    errors
}

/// Every timeout must be at least one second.
pub fn validate_timeouts(timeouts: &TimeoutConfig) -> Vec<ValidationError> {
    [
        (UPSTREAM_CONNECT_TIMEOUT_SECS, timeouts.connect_secs),
        (UPSTREAM_TIMEOUT_SECS, timeouts.upstream_secs),
    ]
    .into_iter()
    .filter(|(_, secs)| *secs == 0)
    .map(|(var, _)| ValidationError::ZeroTimeout { var })
    .collect()
}

fn is_valid_prefix(prefix: &str) -> bool {
    prefix.starts_with('/')
}

fn check_origin(
    errors: &mut Vec<ValidationError>,
    origins: &OriginSet,
    label: OriginLabel,
    context: impl FnOnce() -> String,
) {
    if !origins.contains(label) {
        errors.push(ValidationError::MissingOrigin {
            context: context(),
            label,
            var: env_var_for(label),
        });
    }
}

/// Environment variable that configures an origin.
pub fn env_var_for(label: OriginLabel) -> &'static str {
    match label {
        OriginLabel::Latest => DRUPAL_LATEST_URL,
        OriginLabel::Legacy => DRUPAL_LEGACY_URL,
    }
}
