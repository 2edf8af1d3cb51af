//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.wayfarer/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::mock::{
    DEFAULT_AUTH_LATENCY, DEFAULT_CREATE_LATENCY, DEFAULT_DELETE_LATENCY, DEFAULT_LIST_LATENCY,
    DEFAULT_UPDATE_LATENCY, TripLatency,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WayfarerConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub trips: TripsConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub latency_ms: Option<u64>,
}

/// `latency_ms` sets every operation; the per-operation keys win over it.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TripsConfig {
    pub latency_ms: Option<u64>,
    pub list_latency_ms: Option<u64>,
    pub create_latency_ms: Option<u64>,
    pub update_latency_ms: Option<u64>,
    pub delete_latency_ms: Option<u64>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: PathBuf,
    pub auth_latency: Duration,
    pub trip_latency: TripLatency,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.wayfarer/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wayfarer").join("config.toml"))
}

/// Load config from `~/.wayfarer/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `WayfarerConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<WayfarerConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(WayfarerConfig::default())
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<WayfarerConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(WayfarerConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: WayfarerConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Wayfarer Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# data_dir = "/home/me/.wayfarer"    # Where the session token is kept

# [auth]
# latency_ms = 1000                  # Simulated auth round trip

# [trips]
# latency_ms = 500                   # Sets every operation below at once
# list_latency_ms = 800
# create_latency_ms = 500
# update_latency_ms = 500
# delete_latency_ms = 300
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn env_millis(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(ms) => Some(ms),
        Err(e) => {
            warn!("Ignoring {key}={raw:?}: {e}");
            None
        }
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_data_dir` is the `--data-dir` flag, `cli_instant` the `--instant` flag
/// (drops all simulated latency).
pub fn resolve(
    config: &WayfarerConfig,
    cli_data_dir: Option<&Path>,
    cli_instant: bool,
) -> ResolvedConfig {
    // Data dir: CLI → env → config → ~/.wayfarer → ./.wayfarer
    let data_dir = cli_data_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("WAYFARER_DATA_DIR").ok().map(PathBuf::from))
        .or_else(|| config.general.data_dir.as_ref().map(PathBuf::from))
        .or_else(|| crate::core::storage::default_data_dir().ok())
        .unwrap_or_else(|| PathBuf::from(".wayfarer"));

    if cli_instant {
        return ResolvedConfig {
            data_dir,
            auth_latency: Duration::ZERO,
            trip_latency: TripLatency::uniform(Duration::ZERO),
        };
    }

    // Auth latency: env → config → default
    let auth_latency = env_millis("WAYFARER_AUTH_LATENCY_MS")
        .or(config.auth.latency_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_AUTH_LATENCY);

    // Trip latency: env (uniform) → per-op config → uniform config → default
    let trip_latency = match env_millis("WAYFARER_TRIP_LATENCY_MS") {
        Some(ms) => TripLatency::uniform(Duration::from_millis(ms)),
        None => {
            let trips = &config.trips;
            let pick = |specific: Option<u64>, default: Duration| {
                specific
                    .or(trips.latency_ms)
                    .map(Duration::from_millis)
                    .unwrap_or(default)
            };
            TripLatency {
                list: pick(trips.list_latency_ms, DEFAULT_LIST_LATENCY),
                create: pick(trips.create_latency_ms, DEFAULT_CREATE_LATENCY),
                update: pick(trips.update_latency_ms, DEFAULT_UPDATE_LATENCY),
                delete: pick(trips.delete_latency_ms, DEFAULT_DELETE_LATENCY),
            }
        }
    };

    ResolvedConfig {
        data_dir,
        auth_latency,
        trip_latency,
    }
}
