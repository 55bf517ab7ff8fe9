//! Authentication module
//!
//! HTTP Basic credentials for the `Authorization` header and the PKCS#12
//! client-certificate identity used for mutual TLS.

use base64::Engine;
use reqwest::header::{HeaderValue, InvalidHeaderValue};
use reqwest::Identity;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to read client certificate bundle at {}: {source}", .path.display())]
    BundleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load client certificate bundle at {}: {source}", .path.display())]
    BundleParse {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
}

impl AuthError {
    /// Resolved path of the bundle that failed to load
    pub fn bundle_path(&self) -> &Path {
        match self {
            AuthError::BundleRead { path, .. } | AuthError::BundleParse { path, .. } => path,
        }
    }
}

/// Username/password pair for HTTP Basic authentication
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Basic <base64(username:password)>`
    pub fn encode(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {}", encoded)
    }

    /// Header value marked sensitive so it is skipped by debug output
    pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&self.encode())?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Read and decrypt a PKCS#12 (`.pfx`/`.p12`) client-certificate bundle
pub fn load_identity(path: &Path, passphrase: &str) -> Result<Identity, AuthError> {
    tracing::debug!("Reading client certificate bundle: {}", path.display());

    let der = std::fs::read(path).map_err(|source| AuthError::BundleRead {
        path: path.to_path_buf(),
        source,
    })?;

    let identity =
        Identity::from_pkcs12_der(&der, passphrase).map_err(|source| AuthError::BundleParse {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!("Client certificate loaded from {}", path.display());
    Ok(identity)
}
