//! In-memory tenant store built from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use super::TenantLookup;
use crate::model::{Domain, Tenant, VersionDescriptor};

/// Immutable, indexed snapshot of tenant configuration.
#[derive(Debug, Default)]
pub struct TenantStore {
    tenants: HashMap<String, Arc<Tenant>>,
    versions: HashMap<String, Vec<VersionDescriptor>>,
    domains_by_host: HashMap<String, Domain>,
    domains_by_tenant: HashMap<String, Vec<Domain>>,
    parents: HashMap<String, (String, String)>,
}

impl TenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tenant and the versions it knows about.
    pub fn insert_tenant(&mut self, tenant: Tenant, versions: Vec<VersionDescriptor>) {
        for mount in &tenant.subprojects {
            self.parents
                .insert(mount.tenant.clone(), (tenant.slug.clone(), mount.alias.clone()));
        }
        self.versions.insert(tenant.slug.clone(), versions);
        self.tenants.insert(tenant.slug.clone(), Arc::new(tenant));
    }

    /// Add a domain; the first record for a hostname wins.
    pub fn insert_domain(&mut self, mut domain: Domain) {
        domain.hostname = domain.hostname.to_ascii_lowercase();
        if self.domains_by_host.contains_key(&domain.hostname) {
            tracing::warn!(hostname = %domain.hostname, "Duplicate domain ignored");
            return;
        }
        self.domains_by_tenant
            .entry(domain.tenant.clone())
            .or_default()
            .push(domain.clone());
        self.domains_by_host.insert(domain.hostname.clone(), domain);
    }

    pub fn tenant_count(&self) -> usize {
        self.tenants.len()
    }

    pub fn domain_count(&self) -> usize {
        self.domains_by_host.len()
    }

    /// All tenants, sorted by slug.
    pub fn tenants(&self) -> Vec<Arc<Tenant>> {
        let mut tenants: Vec<_> = self.tenants.values().cloned().collect();
        tenants.sort_by(|a, b| a.slug.cmp(&b.slug));
        tenants
    }
}

impl TenantLookup for TenantStore {
    fn get_tenant(&self, slug: &str) -> Option<Arc<Tenant>> {
        self.tenants.get(slug).cloned()
    }

    fn get_domains(&self, tenant: &str) -> Vec<Domain> {
        self.domains_by_tenant.get(tenant).cloned().unwrap_or_default()
    }

    fn get_versions(&self, tenant: &str) -> Vec<VersionDescriptor> {
        self.versions.get(tenant).cloned().unwrap_or_default()
    }

    fn find_domain(&self, hostname: &str) -> Option<Domain> {
        self.domains_by_host.get(hostname).cloned()
    }

    fn parent_of(&self, tenant: &str) -> Option<(Arc<Tenant>, String)> {
        let (parent, alias) = self.parents.get(tenant)?;
        Some((self.get_tenant(parent)?, alias.clone()))
    }
}
