//! Custom domains pointing at tenants.

use serde::{Deserialize, Serialize};

use super::TenantRef;

/// A hostname registered for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Domain {
    /// Lowercase hostname, without port.
    pub hostname: String,
    /// Owning tenant.
    pub tenant: TenantRef,
    /// Preferred domain that public-subdomain traffic migrates to.
    #[serde(default)]
    pub canonical: bool,
    /// The domain serves HTTPS; plaintext requests are upgraded.
    #[serde(default)]
    pub https: bool,
}

impl Domain {
    pub fn new(hostname: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into().to_ascii_lowercase(),
            tenant: tenant.into(),
            canonical: false,
            https: false,
        }
    }

    pub fn canonical(mut self) -> Self {
        self.canonical = true;
        self
    }

    pub fn https(mut self) -> Self {
        self.https = true;
        self
    }

    /// Scheme this domain is served over.
    pub fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }
}
