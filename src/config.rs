//! Runtime configuration
//!
//! All credentials and endpoints are gathered into one [`Config`] value up
//! front, so each client receives exactly the settings it needs and a missing
//! variable is reported by name before any network traffic happens.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Media server base URL
pub const ENV_LIBRARY_URL: &str = "JELLY_URL";
/// Media server user name
pub const ENV_LIBRARY_USERNAME: &str = "JELLY_USERNAME";
/// Media server password
pub const ENV_LIBRARY_PASSWORD: &str = "JELLY_PASSWORD";
/// Set to `true` or `1` to skip TLS certificate verification for the media server
pub const ENV_LIBRARY_ACCEPT_INVALID_CERTS: &str = "JELLY_ACCEPT_INVALID_CERTS";
/// Bearer token for the metadata provider
pub const ENV_PROVIDER_TOKEN: &str = "TMDB_BEARER";
/// Optional override of the metadata provider base URL
pub const ENV_PROVIDER_BASE_URL: &str = "TMDB_BASE_URL";
/// Optional override of the detail cache directory
pub const ENV_CACHE_DIR: &str = "SERIES_RECOM_CACHE_DIR";

/// Default metadata provider API root
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default location of the detail record cache, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = "data/tmdb/details_by_ids";

/// Errors raised while assembling the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set or is blank
    #[error("Missing required configuration value {0}")]
    Missing(&'static str),

    /// A variable is set but its value cannot be used
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    /// The explicitly requested env file could not be loaded
    #[error("Failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Settings for the media server (Jellyfin) connection
#[derive(Clone)]
pub struct LibraryConfig {
    /// Base URL, without trailing slash
    pub url: String,
    pub username: String,
    pub password: String,
    /// Disables TLS certificate verification, for self-signed home servers
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for LibraryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// Settings for the metadata provider (TMDB) connection
#[derive(Clone)]
pub struct ProviderConfig {
    /// API root, without trailing slash
    pub base_url: String,
    pub bearer_token: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// Complete configuration of one harvest run
#[derive(Debug, Clone)]
pub struct Config {
    pub library: LibraryConfig,
    pub provider: ProviderConfig,
    /// Directory holding one `{id}.json` file per series
    pub cache_dir: PathBuf,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present;
    /// variables already set in the environment take precedence over it.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration after loading the given env file.
    ///
    /// Unlike [`Config::from_env`], a missing or unreadable file is an error.
    pub fn from_env_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        dotenvy::from_path(path)?;
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let library = LibraryConfig {
            url: normalize_url(ENV_LIBRARY_URL, &require(&lookup, ENV_LIBRARY_URL)?)?,
            username: require(&lookup, ENV_LIBRARY_USERNAME)?,
            password: require(&lookup, ENV_LIBRARY_PASSWORD)?,
            accept_invalid_certs: optional(&lookup, ENV_LIBRARY_ACCEPT_INVALID_CERTS)
                .map(|value| parse_flag(ENV_LIBRARY_ACCEPT_INVALID_CERTS, &value))
                .transpose()?
                .unwrap_or(false),
        };

        let provider = ProviderConfig {
            base_url: match optional(&lookup, ENV_PROVIDER_BASE_URL) {
                Some(url) => normalize_url(ENV_PROVIDER_BASE_URL, &url)?,
                None => DEFAULT_PROVIDER_BASE_URL.to_string(),
            },
            bearer_token: require(&lookup, ENV_PROVIDER_TOKEN)?,
        };

        let cache_dir = optional(&lookup, ENV_CACHE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

        Ok(Self {
            library,
            provider,
            cache_dir,
        })
    }
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn require<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

fn normalize_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("'{}' is not an http(s) URL", value),
        });
    }

    Ok(value.trim_end_matches('/').to_string())
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}
