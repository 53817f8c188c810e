//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.formgate/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! Credentials (the session token) belong in the environment, not the file.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::routes;
use crate::routing::{ParamSchema, RouteDefinition, WellKnownRoutes};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FormgateConfig {
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Extra application routes, registered after the built-in catalog.
    #[serde(default, rename = "route")]
    pub extra_routes: Vec<RouteEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RoutesConfig {
    pub home: Option<String>,
    pub login: Option<String>,
    pub not_found: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Token file path, relative to `~/.formgate/` unless absolute.
    pub file: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteEntry {
    pub name: String,
    /// Unspecified means guarded.
    pub requires_auth: Option<bool>,
    pub screen: Option<String>,
    #[serde(default)]
    pub required_params: Vec<String>,
    #[serde(default)]
    pub optional_params: Vec<String>,
}

impl RouteEntry {
    pub fn to_definition(&self) -> RouteDefinition {
        let base = if self.requires_auth.unwrap_or(true) {
            RouteDefinition::guarded(&self.name)
        } else {
            RouteDefinition::public(&self.name)
        };
        let base = base.with_params(ParamSchema::from_keys(
            self.required_params.iter().cloned(),
            self.optional_params.iter().cloned(),
        ));
        match &self.screen {
            Some(screen) => base.with_screen(screen),
            None => base,
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SESSION_FILE: &str = "session";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub well_known: WellKnownRoutes,
    pub session_file: Option<PathBuf>,
    pub session_token: Option<String>,
    pub extra_routes: Vec<RouteDefinition>,
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

/// Returns `~/.formgate/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".formgate"))
}

/// Returns the path to `~/.formgate/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.formgate/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FormgateConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FormgateConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FormgateConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<FormgateConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(FormgateConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FormgateConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Formgate Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [routes]
# home = "home"                      # Or FORMGATE_HOME_ROUTE
# login = "login"                    # Or FORMGATE_LOGIN_ROUTE
# not_found = "not_found"            # Or FORMGATE_NOT_FOUND_ROUTE

# [session]
# file = "session"                   # Relative to ~/.formgate/, or FORMGATE_SESSION_FILE
# Keep tokens out of this file: set FORMGATE_SESSION_TOKEN (or .env) instead.

# [[route]]
# name = "billing"
# requires_auth = true               # Defaults to true
# screen = "billing"                 # Screen factory key, defaults to name
# required_params = ["account_id"]
# optional_params = ["invoice"]
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

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_session_file` comes from the `--session-file` flag (None = not specified).
pub fn resolve(config: &FormgateConfig, cli_session_file: Option<&Path>) -> ResolvedConfig {
    resolve_with(config, cli_session_file, |key| std::env::var(key).ok())
}

/// Same as `resolve`, reading environment variables through `env`.
pub fn resolve_with<F>(
    config: &FormgateConfig,
    cli_session_file: Option<&Path>,
    env: F,
) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    // Well-known routes: env → config → catalog default
    let route = |key: &str, configured: &Option<String>, default: &str| {
        env(key)
            .or_else(|| configured.clone())
            .unwrap_or_else(|| default.to_string())
    };
    let well_known = WellKnownRoutes {
        home: route("FORMGATE_HOME_ROUTE", &config.routes.home, routes::HOME),
        login: route("FORMGATE_LOGIN_ROUTE", &config.routes.login, routes::LOGIN),
        not_found: route(
            "FORMGATE_NOT_FOUND_ROUTE",
            &config.routes.not_found,
            routes::NOT_FOUND,
        ),
    };

    // Session file: CLI → env → config → default (relative paths live under ~/.formgate/)
    let session_file = cli_session_file
        .map(Path::to_path_buf)
        .or_else(|| env("FORMGATE_SESSION_FILE").map(PathBuf::from))
        .or_else(|| config.session.file.as_ref().map(PathBuf::from))
        .or_else(|| Some(PathBuf::from(DEFAULT_SESSION_FILE)))
        .and_then(|path| {
            if path.is_absolute() {
                Some(path)
            } else {
                config_dir().map(|dir| dir.join(path))
            }
        });

    // Session token: env → config
    let session_token = env("FORMGATE_SESSION_TOKEN").or_else(|| {
        if config.session.token.is_some() {
            warn!("Session token read from config file; prefer FORMGATE_SESSION_TOKEN");
        }
        config.session.token.clone()
    });

    ResolvedConfig {
        well_known,
        session_file,
        session_token,
        extra_routes: config
            .extra_routes
            .iter()
            .map(RouteEntry::to_definition)
            .collect(),
    }
}
