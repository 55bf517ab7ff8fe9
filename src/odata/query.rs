//! Business partner identity query

/// OData function import used for the lookup
pub const FIND_BY_IDENTITY: &str = "FindBusinessPartnerByIdentity";

/// Identity type and number to search for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityQuery {
    pub identity_type: String,
    pub identity_number: String,
}

impl IdentityQuery {
    pub fn new(identity_type: impl Into<String>, identity_number: impl Into<String>) -> Self {
        Self {
            identity_type: identity_type.into(),
            identity_number: identity_number.into(),
        }
    }

    /// Query string (without leading `?`)
    pub fn to_query_string(&self) -> String {
        format!(
            "IdentityTypeId={}&IdentityNr={}",
            odata_string_literal(&self.identity_type),
            odata_string_literal(&self.identity_number)
        )
    }

    /// Full request URL below the given service root
    pub fn to_url(&self, api_base_url: &str) -> String {
        format!(
            "{}/{}?{}",
            api_base_url.trim_end_matches('/'),
            FIND_BY_IDENTITY,
            self.to_query_string()
        )
    }
}

/// Quote a value as an OData string literal (`'` doubled inside)
pub fn odata_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        let query = IdentityQuery::new("DORN", "101070XXX");
        assert!(query
            .to_query_string()
            .contains("IdentityTypeId='DORN'&IdentityNr='101070XXX'"));
    }

    #[test]
    fn test_url() {
        let query = IdentityQuery::new("DORN", "101070XXX");
        assert_eq!(
            query.to_url("https://sap.example.com/sap/opu/odata/sap/ZBP_SRV/"),
            "https://sap.example.com/sap/opu/odata/sap/ZBP_SRV/FindBusinessPartnerByIdentity?IdentityTypeId='DORN'&IdentityNr='101070XXX'"
        );
    }

    #[test]
    fn test_literal_escapes_quotes() {
        assert_eq!(odata_string_literal("O'Brien"), "'O''Brien'");
        assert_eq!(odata_string_literal(""), "''");
    }
}
