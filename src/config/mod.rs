//! Configuration module
//!
//! Loads the required connection settings from the process environment
//! (optionally seeded from a `.env` file).

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CSRF_FETCH_URL: &str = "CSRF_FETCH_URL";
pub const API_BASE_URL: &str = "API_BASE_URL";
pub const API_USERNAME: &str = "API_USERNAME";
pub const API_PASSWORD: &str = "API_PASSWORD";
pub const PFX_FILENAME: &str = "PFX_FILENAME";
pub const PFX_PASSPHRASE: &str = "PFX_PASSPHRASE";

/// Every variable that must be set, in validation order
pub const REQUIRED_VARS: [&str; 6] = [
    CSRF_FETCH_URL,
    API_BASE_URL,
    API_USERNAME,
    API_PASSWORD,
    PFX_FILENAME,
    PFX_PASSPHRASE,
];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: environment variable '{0}' is not defined")]
    MissingVar(&'static str),

    #[error("Cannot determine executable location: {0}")]
    ExecutableDir(#[from] std::io::Error),
}

/// Validated runtime configuration
#[derive(Clone)]
pub struct Config {
    pub csrf_fetch_url: String,
    pub api_base_url: String,
    pub username: String,
    pub password: String,
    pub pfx_path: PathBuf,
    pub pfx_passphrase: String,
}

// Hand-written so credentials never end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("csrf_fetch_url", &self.csrf_fetch_url)
            .field("api_base_url", &self.api_base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("pfx_path", &self.pfx_path)
            .field("pfx_passphrase", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load from the process environment.
    ///
    /// The certificate bundle path is resolved against the directory of the
    /// running executable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_dir = executable_dir()?;
        Self::from_lookup(|name| std::env::var(name).ok(), &base_dir)
    }

    /// Load from an arbitrary name -> value lookup.
    ///
    /// Empty values count as missing. The first missing variable in
    /// [`REQUIRED_VARS`] order is reported.
    pub fn from_lookup<F>(lookup: F, base_dir: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(ConfigError::MissingVar(name)),
            }
        };

        let csrf_fetch_url = require(CSRF_FETCH_URL)?;
        let api_base_url = require(API_BASE_URL)?;
        let username = require(API_USERNAME)?;
        let password = require(API_PASSWORD)?;
        let pfx_filename = require(PFX_FILENAME)?;
        let pfx_passphrase = require(PFX_PASSPHRASE)?;

        Ok(Self {
            csrf_fetch_url,
            api_base_url,
            username,
            password,
            pfx_path: resolve_relative(base_dir, &pfx_filename),
            pfx_passphrase,
        })
    }
}

/// Load a `.env` file from the working directory into the environment.
///
/// A missing file is fine; a malformed one is only warned about since the
/// variables may still come from the real environment.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
}

fn executable_dir() -> Result<PathBuf, ConfigError> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

fn resolve_relative(base_dir: &Path, file: &str) -> PathBuf {
    // `join` keeps absolute paths untouched
    base_dir.join(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (CSRF_FETCH_URL, "https://sap.example.com/sap/opu/odata/sap/API_BP/".to_string()),
            (API_BASE_URL, "https://sap.example.com/sap/opu/odata/sap/ZBP_SRV".to_string()),
            (API_USERNAME, "user".to_string()),
            (API_PASSWORD, "secret".to_string()),
            (PFX_FILENAME, "client.pfx".to_string()),
            (PFX_PASSPHRASE, "changeit".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env.get(name).cloned(), Path::new("/opt/bp"))
    }

    #[test]
    fn test_all_vars_present() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.username, "user");
        assert_eq!(config.password, "secret");
        assert_eq!(config.pfx_passphrase, "changeit");
        assert_eq!(config.pfx_path, PathBuf::from("/opt/bp/client.pfx"));
    }

    #[test]
    fn test_each_missing_var_is_named() {
        for name in REQUIRED_VARS {
            let mut env = full_env();
            env.remove(name);

            let err = load(&env).unwrap_err();
            assert!(matches!(err, ConfigError::MissingVar(n) if n == name));
            assert!(err.to_string().contains(name));
        }
    }

    #[test]
    fn test_empty_var_is_missing() {
        let mut env = full_env();
        env.insert(API_PASSWORD, String::new());
        assert!(matches!(load(&env), Err(ConfigError::MissingVar(API_PASSWORD))));
    }

    #[test]
    fn test_absolute_pfx_path_kept() {
        let mut env = full_env();
        env.insert(PFX_FILENAME, "/etc/certs/client.pfx".to_string());
        let config = load(&env).unwrap();
        assert_eq!(config.pfx_path, PathBuf::from("/etc/certs/client.pfx"));
    }

    #[test]
    fn test_base_url_kept_verbatim() {
        let mut env = full_env();
        env.insert(API_BASE_URL, "https://sap.example.com/ZBP_SRV/".to_string());
        let config = load(&env).unwrap();
        assert_eq!(config.api_base_url, "https://sap.example.com/ZBP_SRV/");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&full_env()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("changeit"));
        assert!(debug.contains("<redacted>"));
    }
}
