//! Configuration loading from the environment and rules files.

use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, RulesFile, TimeoutConfig,
};
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::{OriginLabel, Profile};
use crate::upstream::{Origin, OriginError, OriginSet};

pub const DRUPAL_LATEST_URL: &str = "DRUPAL_LATEST_URL";
pub const DRUPAL_LEGACY_URL: &str = "DRUPAL_LEGACY_URL";
pub const PORT: &str = "PORT";
pub const LISTEN: &str = "LISTEN";
pub const UPSTREAM_CONNECT_TIMEOUT_SECS: &str = "UPSTREAM_CONNECT_TIMEOUT_SECS";
pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error loading {0} env var")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid origin in {var}: {source}")]
    Origin {
        var: &'static str,
        #[source]
        source: OriginError,
    },

    #[error("failed to read rules file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse rules file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Error loading .env: {0}")]
    DotEnv(#[from] dotenv::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where the routing table comes from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Built-in profile supplying the table and forwarding defaults.
    pub profile: Profile,

    /// Optional rules file replacing the profile's table.
    pub rules: Option<PathBuf>,
}

/// Load a `.env` file from the working directory if there is one.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenv::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

/// Load and validate configuration from the process environment.
pub fn load_from_env(options: &LoadOptions) -> Result<ProxyConfig, ConfigError> {
    load_config(options, |key| std::env::var(key).ok())
}

/// Load and validate configuration from a variable lookup.
///
/// Required variables are checked in a fixed order (latest origin, legacy
/// origin, port) and the first missing one is reported.
pub fn load_config<F>(options: &LoadOptions, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (routing, forwarding) = match &options.rules {
        Some(path) => {
            let rules = load_rules_file(path)?;
            let forwarding = rules
                .forwarding
                .unwrap_or_else(|| options.profile.forwarding());
            (rules.routing, forwarding)
        }
        None => (options.profile.route_table(), options.profile.forwarding()),
    };

    let needs_latest = routing
        .referenced_labels()
        .any(|label| label == OriginLabel::Latest);

    let latest = match lookup(DRUPAL_LATEST_URL) {
        Some(raw) => Some(parse_origin(OriginLabel::Latest, DRUPAL_LATEST_URL, &raw)?),
        None if needs_latest => return Err(ConfigError::Missing(DRUPAL_LATEST_URL)),
        None => None,
    };

    let legacy_raw = lookup(DRUPAL_LEGACY_URL).ok_or(ConfigError::Missing(DRUPAL_LEGACY_URL))?;
    let legacy = parse_origin(OriginLabel::Legacy, DRUPAL_LEGACY_URL, &legacy_raw)?;

    let port_raw = lookup(PORT).ok_or(ConfigError::Missing(PORT))?;
    let port = parse_value::<u16>(PORT, &port_raw)?;

    let listen = match lookup(LISTEN) {
        Some(raw) => parse_value::<IpAddr>(LISTEN, &raw)?,
        None => ListenerConfig::default().listen,
    };

    let defaults = TimeoutConfig::default();
    let timeouts = TimeoutConfig {
        connect_secs: optional_value(&lookup, UPSTREAM_CONNECT_TIMEOUT_SECS, defaults.connect_secs)?,
        upstream_secs: optional_value(&lookup, UPSTREAM_TIMEOUT_SECS, defaults.upstream_secs)?,
    };

    let config = ProxyConfig {
        listener: ListenerConfig { listen, port },
        origins: OriginSet::new(legacy, latest),
        profile: options.profile,
        routing,
        forwarding,
        timeouts,
        observability: observability_from(&lookup),
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Logging settings, read before anything else so later errors get logged.
///
/// Unknown `LOG_FORMAT` values fall back to the pretty format.
pub fn observability_from<F>(lookup: F) -> ObservabilityConfig
where
    F: Fn(&str) -> Option<String>,
{
    let log_format = match lookup(LOG_FORMAT) {
        Some(value) if value.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    };

    ObservabilityConfig {
        log_format,
        ..ObservabilityConfig::default()
    }
}

/// Read and parse a TOML rules file.
pub fn load_rules_file(path: &Path) -> Result<RulesFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&content, path)
}

fn parse_rules(content: &str, path: &Path) -> Result<RulesFile, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_origin(label: OriginLabel, var: &'static str, raw: &str) -> Result<Origin, ConfigError> {
    Origin::parse(label, raw).map_err(|source| ConfigError::Origin { var, source })
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn optional_value<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => parse_value(var, &raw),
        None => Ok(default),
    }
}
