//! Tenant, domain and version data model.
//!
//! # Data Flow
//! ```text
//! config file ([[tenants]], [[domains]])
//!     → config::schema (deserialize)
//!     → model types (immutable, shared via Arc)
//!     → store::TenantStore (indexed lookups)
//!     → routing / versions (read-only consumers)
//! ```
//!
//! # Design Decisions
//! - Tenants reference each other by slug, never by pointer
//! - Translations and subprojects are edges owned by the main/super tenant
//! - Nothing in here performs I/O or mutates after construction

pub mod domain;
pub mod tenant;
pub mod version;

pub use domain::Domain;
pub use tenant::{SubprojectMount, Tenant, TenantRef};
pub use version::{VersionDescriptor, VersionKind};

use serde::Serialize;

/// How the tenant of a request was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Trusted slug header sent by an upstream operator.
    Header,
    /// `{slug}.{public_domain}`.
    PublicSubdomain,
    /// A hostname registered as a [`Domain`].
    CustomDomain,
}

impl ResolutionMethod {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::Header => "header",
            ResolutionMethod::PublicSubdomain => "public_subdomain",
            ResolutionMethod::CustomDomain => "custom_domain",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
