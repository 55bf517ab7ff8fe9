//! Session artifacts returned by the CSRF token endpoint

use super::client::ODataError;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, SET_COOKIE};

/// Header used both to request (`Fetch`) and to receive the CSRF token
pub const CSRF_TOKEN_HEADER: &str = "X-CSRF-Token";

/// CSRF token and session cookies from the token-fetch response
#[derive(Clone, PartialEq, Eq)]
pub struct SessionArtifacts {
    pub csrf_token: Option<String>,
    /// Raw `Set-Cookie` values, bytes kept as sent
    pub cookies: Vec<HeaderValue>,
}

impl std::fmt::Debug for SessionArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionArtifacts")
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<redacted>"))
            .field("cookies", &self.cookies.len())
            .finish()
    }
}

impl SessionArtifacts {
    /// Extract every `Set-Cookie` value and the CSRF token.
    ///
    /// Cookies are mandatory for the follow-up request; the token is not.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ODataError> {
        let cookies: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();

        if cookies.is_empty() {
            return Err(ODataError::MissingSessionCookies);
        }

        let csrf_token = headers
            .get(CSRF_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Self { csrf_token, cookies })
    }

    /// Value for the `Cookie` request header
    pub fn cookie_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut joined = Vec::new();
        for (i, cookie) in self.cookies.iter().enumerate() {
            if i > 0 {
                joined.extend_from_slice(b"; ");
            }
            joined.extend_from_slice(cookie.as_bytes());
        }

        let mut value = HeaderValue::from_bytes(&joined)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cookies_is_an_error() {
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_TOKEN_HEADER, HeaderValue::from_static("abc=="));

        let result = SessionArtifacts::from_headers(&headers);
        assert!(matches!(result, Err(ODataError::MissingSessionCookies)));
    }

    #[test]
    fn test_cookies_joined_in_order() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("SAP_SESSIONID_PRD_100=xyz; path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("sap-usercontext=sap-client=100; path=/"));
        headers.insert(CSRF_TOKEN_HEADER, HeaderValue::from_static("Tk3n=="));

        let session = SessionArtifacts::from_headers(&headers).unwrap();
        assert_eq!(session.csrf_token.as_deref(), Some("Tk3n=="));
        assert_eq!(session.cookies.len(), 2);
        assert_eq!(
            session.cookie_header().unwrap(),
            "SAP_SESSIONID_PRD_100=xyz; path=/; sap-usercontext=sap-client=100; path=/"
        );
    }

    #[test]
    fn test_token_is_optional() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));

        let session = SessionArtifacts::from_headers(&headers).unwrap();
        assert_eq!(session.csrf_token, None);
        assert_eq!(session.cookie_header().unwrap(), "a=1");
    }

    #[test]
    fn test_non_ascii_cookie_kept() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_bytes("MYSAPSSO2=café; path=/".as_bytes()).unwrap(),
        );

        let session = SessionArtifacts::from_headers(&headers).unwrap();
        assert_eq!(session.cookies.len(), 1);
        assert_eq!(
            session.cookie_header().unwrap().as_bytes(),
            "MYSAPSSO2=café; path=/".as_bytes()
        );
    }
}
