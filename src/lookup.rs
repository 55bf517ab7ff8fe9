//! Request orchestration
//!
//! Runs the two-step lookup (session handshake, then identity query) and
//! renders its outcome for the terminal.

use crate::odata::{summarize_error_body, FailureKind, IdentityQuery, ODataClient, ODataError};
use serde_json::Value;
use std::io::{self, Write};
use thiserror::Error;

/// Lookup errors
#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    OData(#[from] ODataError),

    #[error("Output error: {0}")]
    Output(#[from] io::Error),

    #[error("Failed to render response: {0}")]
    Render(#[from] serde_json::Error),
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::OData(e) => e.kind(),
            _ => FailureKind::Local,
        }
    }
}

/// Knobs for a single lookup run
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupOptions {
    /// Forward the CSRF token on the query request
    pub send_csrf_token: bool,
}

/// Fetch a session and query business partners, writing progress and the
/// pretty-printed result to `out`.
pub async fn run_lookup<W: Write>(
    client: &ODataClient,
    query: &IdentityQuery,
    options: LookupOptions,
    out: &mut W,
) -> Result<Value, LookupError> {
    writeln!(
        out,
        "1. Fetching CSRF token and session cookies from: {}",
        client.csrf_fetch_url()
    )?;

    let session = client.fetch_session().await?;

    match session.csrf_token {
        Some(ref token) => writeln!(out, "   -> CSRF token (for future POST requests): {}", token)?,
        None => writeln!(out, "   -> CSRF token: not issued")?,
    }
    writeln!(out, "   -> Session cookies obtained successfully.")?;

    writeln!(
        out,
        "\n2. Sending GET request to: {}",
        client.identity_query_url(query)
    )?;

    let response = client
        .find_business_partner_by_identity(&session, query, options.send_csrf_token)
        .await?;

    writeln!(out, "\nQuery succeeded!")?;
    writeln!(out, "Server response:")?;
    writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;

    tracing::info!(
        "Lookup for {} {} completed",
        query.identity_type,
        query.identity_number
    );

    Ok(response)
}

/// Write the error report matching the failure path
pub fn report_error<W: Write>(err: &LookupError, out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- AN ERROR OCCURRED ---")?;

    match err {
        LookupError::OData(ODataError::ServerError(status, body)) => {
            writeln!(out, "Status: {}", status)?;
            if let Some(summary) = summarize_error_body(body) {
                writeln!(out, "Message: {}", summary)?;
            }
            writeln!(out, "Data: {}", body)?;
        }
        LookupError::OData(ODataError::NoResponse {
            method,
            url,
            source,
        }) => {
            writeln!(out, "No response received from server: {} {}", method, url)?;
            writeln!(out, "Cause: {}", source)?;
        }
        _ => {
            writeln!(out, "Configuration error: {}", err)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(err: LookupError) -> String {
        let mut buf = Vec::new();
        report_error(&err, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_report_http_error() {
        let text = render(LookupError::OData(ODataError::ServerError(
            403,
            r#"{"error":{"code":"AUTH","message":{"lang":"en","value":"No authorization"}}}"#
                .to_string(),
        )));

        assert!(text.contains("Status: 403"));
        assert!(text.contains("Message: AUTH: No authorization"));
        assert!(text.contains("Data: {\"error\""));
    }

    #[test]
    fn test_report_plain_http_error_body() {
        let text = render(LookupError::OData(ODataError::ServerError(
            502,
            "Bad Gateway".to_string(),
        )));

        assert!(text.contains("Status: 502"));
        assert!(!text.contains("Message:"));
        assert!(text.contains("Data: Bad Gateway"));
    }

    #[test]
    fn test_report_missing_cookies_as_local() {
        let text = render(LookupError::OData(ODataError::MissingSessionCookies));
        assert!(text.contains("Configuration error: Could not obtain session cookies"));
        assert!(!text.contains("Status:"));
    }
}
