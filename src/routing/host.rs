//! Host → tenant resolution.
//!
//! # Responsibilities
//! - Honour the trusted slug header for tenants that opted in
//! - Map `{slug}.{public_domain}` to a tenant
//! - Map registered custom domains to their tenant
//! - Record first sightings of public subdomains
//!
//! # Design Decisions
//! - First match wins: header, public subdomain, custom domain
//! - A slug header aimed at a tenant without the opt-in is rejected
//!   outright instead of falling through to host matching
//! - Nested public subdomains (`a.b.{public_domain}`) are malformed, not
//!   looked up
//! - Host comparison is case-insensitive and ignores the port

use std::sync::Arc;
use std::time::SystemTime;

use axum::http::HeaderMap;
use dashmap::DashMap;

use super::error::ResolutionError;
use crate::config::RoutingConfig;
use crate::model::{Domain, ResolutionMethod, Tenant};
use crate::observability::metrics;
use crate::store::TenantLookup;

/// The tenant a request is addressed to.
#[derive(Debug, Clone)]
pub struct HostResolution {
    pub tenant: Arc<Tenant>,
    pub method: ResolutionMethod,
    /// Custom domain record, for [`ResolutionMethod::CustomDomain`].
    pub domain: Option<Domain>,
    /// Normalized hostname the request arrived on.
    pub hostname: String,
}

/// First sighting of a public subdomain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenHost {
    pub tenant: String,
    pub first_seen: SystemTime,
}

/// Tracking metadata for public subdomains without a domain record.
///
/// Recording is idempotent and never influences resolution.
#[derive(Debug, Default)]
pub struct SeenHosts {
    hosts: DashMap<String, SeenHost>,
}

impl SeenHosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hostname`. Returns true on its first sighting.
    pub fn observe(&self, hostname: &str, tenant: &str) -> bool {
        if self.hosts.contains_key(hostname) {
            return false;
        }
        let mut inserted = false;
        self.hosts.entry(hostname.to_string()).or_insert_with(|| {
            inserted = true;
            SeenHost {
                tenant: tenant.to_string(),
                first_seen: SystemTime::now(),
            }
        });
        if inserted {
            tracing::info!(host = %hostname, tenant = %tenant, "First request for public subdomain");
            metrics::record_seen_host();
        }
        inserted
    }

    pub fn get(&self, hostname: &str) -> Option<SeenHost> {
        self.hosts.get(hostname).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Resolves the tenant of a request from its host and headers.
pub struct HostResolver<'a, L: TenantLookup + ?Sized> {
    lookup: &'a L,
    settings: &'a RoutingConfig,
    seen: &'a SeenHosts,
}

impl<'a, L: TenantLookup + ?Sized> HostResolver<'a, L> {
    pub fn new(lookup: &'a L, settings: &'a RoutingConfig, seen: &'a SeenHosts) -> Self {
        Self {
            lookup,
            settings,
            seen,
        }
    }

    pub fn resolve(&self, host: &str, headers: &HeaderMap) -> Result<HostResolution, ResolutionError> {
        let hostname = normalize_host(host);

        if let Some(value) = headers.get(self.settings.slug_header.as_str()) {
            return self.resolve_header(value.to_str().unwrap_or_default().trim(), hostname);
        }

        if hostname.is_empty() {
            return Err(ResolutionError::Malformed("empty host".to_string()));
        }

        let public_domain = self.settings.public_domain.to_ascii_lowercase();
        if let Some(label) = hostname.strip_suffix(public_domain.as_str()).and_then(|l| l.strip_suffix('.')) {
            if label.is_empty() || label.contains('.') {
                return Err(ResolutionError::Malformed(hostname));
            }
            let tenant = self
                .lookup
                .get_tenant(label)
                .ok_or_else(|| ResolutionError::NotFound(format!("no project `{label}`")))?;
            if self.lookup.find_domain(&hostname).is_none() {
                self.seen.observe(&hostname, &tenant.slug);
            }
            return Ok(HostResolution {
                tenant,
                method: ResolutionMethod::PublicSubdomain,
                domain: None,
                hostname,
            });
        }

        if let Some(domain) = self.lookup.find_domain(&hostname) {
            let tenant = self.lookup.get_tenant(&domain.tenant).ok_or_else(|| {
                ResolutionError::NotFound(format!("domain `{hostname}` points at a missing project"))
            })?;
            return Ok(HostResolution {
                tenant,
                method: ResolutionMethod::CustomDomain,
                domain: Some(domain),
                hostname,
            });
        }

        Err(ResolutionError::NotFound(format!("domain `{hostname}` is not configured")))
    }

    fn resolve_header(&self, slug: &str, hostname: String) -> Result<HostResolution, ResolutionError> {
        match self.lookup.get_tenant(slug) {
            Some(tenant) if tenant.resolve_from_header => Ok(HostResolution {
                tenant,
                method: ResolutionMethod::Header,
                domain: None,
                hostname,
            }),
            _ => {
                tracing::warn!(
                    header = %self.settings.slug_header,
                    slug = %slug,
                    host = %hostname,
                    "Slug header rejected: project has not opted in"
                );
                Err(ResolutionError::Forbidden(format!(
                    "header resolution is not enabled for `{slug}`"
                )))
            }
        }
    }
}

/// Lowercase, strip the port and any trailing dot.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if let Some(rest) = host.strip_prefix('[') {
        // [v6]:port
        rest.split(']').next().unwrap_or_default()
    } else {
        host.rsplit_once(':').map_or(host, |(name, _)| name)
    };
    without_port.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TenantStore;

    fn settings() -> RoutingConfig {
        RoutingConfig {
            public_domain: "docs.test".into(),
            ..RoutingConfig::default()
        }
    }

    fn store() -> TenantStore {
        let mut store = TenantStore::new();
        store.insert_tenant(Tenant::new("pip"), Vec::new());
        let mut opted = Tenant::new("opted");
        opted.resolve_from_header = true;
        store.insert_tenant(opted, Vec::new());
        store.insert_domain(Domain::new("pip.example.com", "pip").https());
        store
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Pip.Docs.Test:8080"), "pip.docs.test");
        assert_eq!(normalize_host("example.com."), "example.com");
        assert_eq!(normalize_host("[::1]:80"), "::1");
    }

    #[test]
    fn test_public_subdomain() {
        let (store, settings, seen) = (store(), settings(), SeenHosts::new());
        let resolver = HostResolver::new(&store, &settings, &seen);
        let resolved = resolver.resolve("PIP.docs.test", &HeaderMap::new()).unwrap();
        assert_eq!(resolved.tenant.slug, "pip");
        assert_eq!(resolved.method, ResolutionMethod::PublicSubdomain);
        assert!(resolved.domain.is_none());
    }

    #[test]
    fn test_nested_public_subdomain_is_malformed() {
        let (store, settings, seen) = (store(), settings(), SeenHosts::new());
        let resolver = HostResolver::new(&store, &settings, &seen);
        let err = resolver.resolve("a.pip.docs.test", &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ResolutionError::Malformed(_)));
    }

    #[test]
    fn test_unknown_hosts() {
        let (store, settings, seen) = (store(), settings(), SeenHosts::new());
        let resolver = HostResolver::new(&store, &settings, &seen);
        for host in ["missing.docs.test", "docs.test", "other.example.com"] {
            let err = resolver.resolve(host, &HeaderMap::new()).unwrap_err();
            assert!(matches!(err, ResolutionError::NotFound(_)), "{host}");
        }
        assert!(matches!(
            resolver.resolve("", &HeaderMap::new()),
            Err(ResolutionError::Malformed(_))
        ));
    }

    #[test]
    fn test_custom_domain() {
        let (store, settings, seen) = (store(), settings(), SeenHosts::new());
        let resolver = HostResolver::new(&store, &settings, &seen);
        let resolved = resolver.resolve("pip.example.com", &HeaderMap::new()).unwrap();
        assert_eq!(resolved.method, ResolutionMethod::CustomDomain);
        assert!(resolved.domain.unwrap().https);
    }

    #[test]
    fn test_header_requires_opt_in() {
        let (store, settings, seen) = (store(), settings(), SeenHosts::new());
        let resolver = HostResolver::new(&store, &settings, &seen);

        let resolved = resolver
            .resolve("pip.docs.test", &headers(&[("x-docs-slug", "opted")]))
            .unwrap();
        assert_eq!(resolved.tenant.slug, "opted");
        assert_eq!(resolved.method, ResolutionMethod::Header);

        for value in ["pip", "missing", ""] {
            let err = resolver
                .resolve("opted.docs.test", &headers(&[("x-docs-slug", value)]))
                .unwrap_err();
            assert!(matches!(err, ResolutionError::Forbidden(_)), "{value}");
        }
    }

    #[test]
    fn test_seen_hosts_are_recorded_once() {
        let (store, settings, seen) = (store(), settings(), SeenHosts::new());
        let resolver = HostResolver::new(&store, &settings, &seen);
        resolver.resolve("pip.docs.test", &HeaderMap::new()).unwrap();
        resolver.resolve("pip.docs.test:443", &HeaderMap::new()).unwrap();
        resolver.resolve("pip.example.com", &HeaderMap::new()).unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.get("pip.docs.test").unwrap().tenant, "pip");
        assert!(!seen.observe("pip.docs.test", "pip"));
    }
}
