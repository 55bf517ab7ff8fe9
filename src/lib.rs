//! Business Partner identity lookup
//!
//! Two-step client for an SAP-style OData service: fetch a CSRF token and
//! session cookies, then query `FindBusinessPartnerByIdentity` with them.
//! Requests carry HTTP Basic credentials and a PKCS#12 client certificate.

pub mod auth;
pub mod cli;
pub mod config;
pub mod lookup;
pub mod odata;

pub use auth::{load_identity, AuthError, BasicCredentials};
pub use config::{Config, ConfigError};
pub use lookup::{report_error, run_lookup, LookupError, LookupOptions};
pub use odata::{FailureKind, IdentityQuery, ODataClient, ODataError, SessionArtifacts};
