//! Command-line arguments

use crate::lookup::LookupOptions;
use crate::odata::IdentityQuery;
use clap::Parser;

/// Look up SAP business partners by identity over an authenticated OData session
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Identity type code, e.g. DORN
    #[arg(long, short = 't')]
    pub identity_type: String,

    /// Identity number to search for
    #[arg(long, short = 'n')]
    pub identity_number: String,

    /// Also send the CSRF token on the lookup request
    #[arg(long)]
    pub send_csrf_token: bool,
}

impl Cli {
    pub fn query(&self) -> IdentityQuery {
        IdentityQuery::new(self.identity_type.clone(), self.identity_number.clone())
    }

    pub fn options(&self) -> LookupOptions {
        LookupOptions {
            send_csrf_token: self.send_csrf_token,
        }
    }
}
