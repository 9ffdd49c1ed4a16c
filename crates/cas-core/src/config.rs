//! Environment Configuration Loader
//!
//! Loads environment variables from the canonical location
//! `/etc/cas-billing/environment` (or `.env` during development), then builds
//! a [`ReportConfig`] from the process environment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cas_core::config::{load_environment, ReportConfig};
//!
//! load_environment();
//! let config = ReportConfig::from_env().expect("vendor API settings");
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Default path for the environment file
pub const DEFAULT_ENV_FILE: &str = "/etc/cas-billing/environment";

/// Alternative paths to check (in order of priority)
pub const ENV_FILE_PATHS: &[&str] = &[DEFAULT_ENV_FILE, ".env"];

pub const ENV_API_KEY: &str = "BD_API_KEY";
pub const ENV_QUERY_ID: &str = "BD_QUERY_ID";
pub const ENV_DOMAIN: &str = "BD_DOMAIN";
pub const ENV_ROOT_ID: &str = "BD_NET_ROOT_ID";
pub const ENV_VERBOSE: &str = "VERBOSE_MODE";
pub const ENV_TIMEOUT: &str = "CAS_REQUEST_TIMEOUT_SECS";
pub const ENV_MONTHLY_USAGE: &str = "CAS_MONTHLY_USAGE";
pub const ENV_RECURSIVE_ENDPOINTS: &str = "CAS_RECURSIVE_ENDPOINTS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Load environment variables from the canonical configuration file.
///
/// Checks `CAS_ENV_FILE` first, then [`ENV_FILE_PATHS`] in order. Existing
/// environment variables are never overridden.
///
/// Returns the path that was loaded, or None if no file was found.
pub fn load_environment() -> Option<String> {
    if let Ok(custom_path) = std::env::var("CAS_ENV_FILE") {
        if let Some(path) = try_load_env_file(&custom_path) {
            return Some(path);
        }
    }

    for path in ENV_FILE_PATHS {
        if let Some(loaded_path) = try_load_env_file(path) {
            return Some(loaded_path);
        }
    }

    debug!("No environment file found, using existing environment");
    None
}

fn try_load_env_file(path: &str) -> Option<String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return None;
    }

    match fs::read_to_string(path_obj) {
        Ok(content) => {
            let mut loaded_count = 0;
            let mut skipped_count = 0;

            for line in content.lines() {
                let line = line.trim();

                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                if let Some((key, value)) = parse_env_line(line) {
                    if std::env::var(&key).is_err() {
                        std::env::set_var(&key, &value);
                        loaded_count += 1;
                        debug!("Loaded: {}={}", key, redact(&key, &value));
                    } else {
                        skipped_count += 1;
                        debug!("Skipped (already set): {}", key);
                    }
                }
            }

            info!(
                "Loaded {} environment variables from {} ({} skipped - already set)",
                loaded_count, path, skipped_count
            );

            Some(path.to_string())
        }
        Err(e) => {
            warn!("Failed to read environment file {}: {}", path, e);
            None
        }
    }
}

fn redact<'a>(key: &str, value: &'a str) -> &'a str {
    if key.contains("KEY") || key.contains("TOKEN") || key.contains("SECRET") {
        "***"
    } else {
        value
    }
}

/// Parse a single environment line into key-value pair.
///
/// Accepts `KEY=VALUE`, `KEY="VALUE"`, `KEY='VALUE'` and an optional
/// leading `export`.
fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.strip_prefix("export ").unwrap_or(line);
    let mut parts = line.splitn(2, '=');
    let key = parts.next()?.trim();
    let value = parts.next()?.trim();

    if key.is_empty() {
        return None;
    }

    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Some((key.to_string(), value.to_string()))
}

/// Get an optional configuration value.
pub fn get_config_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an integer configuration value.
pub fn get_config_int(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Settings for talking to the vendor API and shaping a report run
#[derive(Clone)]
pub struct ReportConfig {
    /// Raw API key, sent Basic-encoded on every call
    pub api_key: String,
    /// JSON-RPC request id
    pub query_id: String,
    /// Vendor base URL, e.g. `https://cloud.example.com/api`
    pub domain: String,
    /// Inventory id whose single child is the "Companies" group
    pub root_id: String,
    pub verbose: bool,
    /// Per-call timeout
    pub request_timeout: Duration,
    /// Issue the monthly usage lookup for each client
    pub monthly_usage: bool,
    /// Ask the vendor to list endpoints of nested folders too
    pub recursive_endpoints: bool,
}

impl ReportConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(get_config_opt)
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| Error::config(format!("{} is not set", key)))
        };
        let flag = |key: &str, default: bool| lookup(key).map(|v| parse_bool(&v)).unwrap_or(default);

        let timeout_secs = match lookup(ENV_TIMEOUT) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::config(format!("{} must be a whole number of seconds, got {:?}", ENV_TIMEOUT, raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(Error::config(format!("{} must be greater than zero", ENV_TIMEOUT)));
        }

        Ok(Self {
            api_key: required(ENV_API_KEY)?,
            query_id: required(ENV_QUERY_ID)?,
            domain: required(ENV_DOMAIN)?.trim_end_matches('/').to_string(),
            root_id: required(ENV_ROOT_ID)?,
            verbose: flag(ENV_VERBOSE, false),
            request_timeout: Duration::from_secs(timeout_secs),
            monthly_usage: flag(ENV_MONTHLY_USAGE, true),
            recursive_endpoints: flag(ENV_RECURSIVE_ENDPOINTS, false),
        })
    }
}

impl std::fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportConfig")
            .field("api_key", &"***")
            .field("query_id", &self.query_id)
            .field("domain", &self.domain)
            .field("root_id", &self.root_id)
            .field("verbose", &self.verbose)
            .field("request_timeout", &self.request_timeout)
            .field("monthly_usage", &self.monthly_usage)
            .field("recursive_endpoints", &self.recursive_endpoints)
            .finish()
    }
}
