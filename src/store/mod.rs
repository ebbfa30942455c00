//! Tenant configuration lookups.
//!
//! # Data Flow
//! ```text
//! persistent store / config file
//!     → TenantLookup implementation (read-only, eventually consistent)
//!     → HostResolver   (get_tenant, find_domain)
//!     → PathResolver   (get_tenant for translations and subprojects)
//!     → RedirectPolicy (get_domains, parent_of)
//!     → VersionOrderer (get_versions)
//! ```
//!
//! # Design Decisions
//! - The routing core only sees this trait, never the storage behind it
//! - Lookups are synchronous and infallible: a missing record is `None`

pub mod memory;

pub use memory::TenantStore;

use std::sync::Arc;

use crate::model::{Domain, Tenant, VersionDescriptor};

/// Read-only access to tenants, domains and versions.
pub trait TenantLookup: Send + Sync {
    /// Tenant by slug.
    fn get_tenant(&self, slug: &str) -> Option<Arc<Tenant>>;

    /// Domains of a tenant, oldest first.
    fn get_domains(&self, tenant: &str) -> Vec<Domain>;

    /// Versions of a tenant, in storage order.
    fn get_versions(&self, tenant: &str) -> Vec<VersionDescriptor>;

    /// Domain record for a lowercase hostname.
    fn find_domain(&self, hostname: &str) -> Option<Domain>;

    /// The tenant `tenant` is mounted under, with its alias there.
    fn parent_of(&self, tenant: &str) -> Option<(Arc<Tenant>, String)>;

    /// The first canonical domain of a tenant, if any.
    fn canonical_domain(&self, tenant: &str) -> Option<Domain> {
        self.get_domains(tenant).into_iter().find(|d| d.canonical)
    }
}
