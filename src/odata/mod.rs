//! OData module
//!
//! HTTP client, session handshake and query building for the business
//! partner OData service

pub mod client;
pub mod query;
pub mod session;

pub use client::{summarize_error_body, FailureKind, ODataClient, ODataError};
pub use query::{odata_string_literal, IdentityQuery};
pub use session::SessionArtifacts;
