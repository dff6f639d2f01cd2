//! Configuration loader
//!
//! Loads service configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `THREADPILOT_VEHICLE_SERVICE_URL` is unset, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `THREADPILOT_VEHICLE_SERVICE_URL`: Vehicle service base URL (required)
//! - `THREADPILOT_VEHICLE_SERVICE_TIMEOUT_SECS`: Per-attempt timeout
//! - `THREADPILOT_BIND_ADDRESS`: Listen address for the running binary
//! - `THREADPILOT_RETRY_MAX_ATTEMPTS`: Total attempts per vehicle lookup
//! - `THREADPILOT_RETRY_BACKOFF_BASE_SECS`: Exponential backoff base
//! - `THREADPILOT_TRANSIENT_STATUSES`: Comma-separated extra transient statuses
//! - `THREADPILOT_BREAKER_FAILURE_THRESHOLD`: Failures that open the circuit
//! - `THREADPILOT_BREAKER_BREAK_DURATION_SECS`: Open-circuit duration
//! - `THREADPILOT_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./threadpilot.{toml,json}` or `./config.{toml,json}` (working directory)
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use threadpilot_domain::{
    Config, LoggingConfig, ResilienceConfig, Result, ServerConfig, ThreadPilotError,
    VehicleServiceConfig,
};

const VEHICLE_SERVICE_URL: &str = "THREADPILOT_VEHICLE_SERVICE_URL";

const CONFIG_FILE_NAMES: &[&str] =
    &["threadpilot.toml", "threadpilot.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ThreadPilotError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Like [`load`], but falls back to built-in defaults when neither the
/// environment nor any probed file provides a configuration.
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default() -> Result<Config> {
    if std::env::var_os(VEHICLE_SERVICE_URL).is_some() {
        return load_from_env();
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration found, using defaults");
            let mut config = Config::default();
            apply_env_overrides(&mut config)?;
            config.validate()?;
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// `THREADPILOT_VEHICLE_SERVICE_URL` must be set; every other variable
/// falls back to its default.
///
/// # Errors
/// Returns `ThreadPilotError::Config` if the required variable is missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var(VEHICLE_SERVICE_URL)?;

    let mut config = Config {
        vehicle_service: VehicleServiceConfig { base_url, ..VehicleServiceConfig::default() },
        server: ServerConfig::default(),
        resilience: ResilienceConfig::default(),
        logging: LoggingConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Overlay optional environment variables onto `config`
fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(timeout) = env_parse::<u64>("THREADPILOT_VEHICLE_SERVICE_TIMEOUT_SECS")? {
        config.vehicle_service.timeout_secs = timeout;
    }
    if let Ok(bind) = std::env::var("THREADPILOT_BIND_ADDRESS") {
        config.server.bind_address = Some(bind);
    }
    if let Some(attempts) = env_parse::<u32>("THREADPILOT_RETRY_MAX_ATTEMPTS")? {
        config.resilience.max_attempts = attempts;
    }
    if let Some(base) = env_parse::<u32>("THREADPILOT_RETRY_BACKOFF_BASE_SECS")? {
        config.resilience.backoff_base_secs = base;
    }
    if let Ok(raw) = std::env::var("THREADPILOT_TRANSIENT_STATUSES") {
        config.resilience.transient_statuses = parse_status_list(&raw)?;
    }
    if let Some(threshold) = env_parse::<u32>("THREADPILOT_BREAKER_FAILURE_THRESHOLD")? {
        config.resilience.failure_threshold = threshold;
    }
    if let Some(secs) = env_parse::<u64>("THREADPILOT_BREAKER_BREAK_DURATION_SECS")? {
        config.resilience.break_duration_secs = secs;
    }
    config.logging.json = env_bool("THREADPILOT_LOG_JSON", config.logging.json);

    Ok(())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ThreadPilotError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - A value fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ThreadPilotError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ThreadPilotError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ThreadPilotError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, by file extension
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ThreadPilotError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ThreadPilotError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ThreadPilotError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, its parent and grandparent, then the
/// directory holding the executable. Returns the first file that exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
        roots.push(cwd.join("../.."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ThreadPilotError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable, rejecting malformed values
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ThreadPilotError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn parse_status_list(raw: &str) -> Result<Vec<u16>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u16>()
                .map_err(|e| ThreadPilotError::Config(format!("Invalid status code {}: {}", s, e)))
        })
        .collect()
}
