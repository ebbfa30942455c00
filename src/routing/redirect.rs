//! Canonical-URL redirects.
//!
//! # Data Flow
//! ```text
//! (request, HostResolution, path result)
//!     → 1. host tenant is someone's subproject   → parent host + mount path
//!     → 2. domain record requires https           → same URL over https
//!     → 3. public subdomain, canonical+https domain → canonical domain
//!     → 3b. public domain serves https            → same URL over https
//!     → 4. path incomplete                        → completed path, same host
//!     → path error, or Proceed
//! ```
//!
//! # Design Decisions
//! - Every redirect is a 302; the reason tag is for logs and metrics only
//! - Host checks run before path errors: a moved host redirects even when
//!   the path would not resolve there
//! - Subproject-owned custom domains are never served from
//! - The query string survives every redirect

use axum::http::StatusCode;
use url::Url;

use super::cache::PatternCache;
use super::error::ResolutionError;
use super::host::HostResolution;
use super::unresolver::{mount_path, PathResolution, ResolvedPath};
use crate::config::RoutingConfig;
use crate::model::{ResolutionMethod, Tenant};
use crate::store::TenantLookup;

/// Why a request was redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    SubprojectToMainDomain,
    Https,
    CanonicalDomain,
    PathCompletion,
}

impl RedirectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectReason::SubprojectToMainDomain => "subproject_to_main_domain",
            RedirectReason::Https => "https",
            RedirectReason::CanonicalDomain => "canonical_domain",
            RedirectReason::PathCompletion => "path_completion",
        }
    }
}

impl std::fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub reason: RedirectReason,
}

impl Redirect {
    pub fn status(&self) -> StatusCode {
        StatusCode::FOUND
    }
}

/// What to do with a request once host and path are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Redirect(Redirect),
    Proceed(ResolvedPath),
}

/// The parts of the inbound request redirects are built from.
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'r> {
    pub scheme: &'r str,
    pub path: &'r str,
    pub query: Option<&'r str>,
}

impl RequestTarget<'_> {
    fn is_https(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("https")
    }
}

pub struct RedirectPolicy<'a, L: TenantLookup + ?Sized> {
    lookup: &'a L,
    settings: &'a RoutingConfig,
    cache: &'a PatternCache,
}

impl<'a, L: TenantLookup + ?Sized> RedirectPolicy<'a, L> {
    pub fn new(lookup: &'a L, settings: &'a RoutingConfig, cache: &'a PatternCache) -> Self {
        Self {
            lookup,
            settings,
            cache,
        }
    }

    pub fn decide(
        &self,
        request: RequestTarget<'_>,
        host: &HostResolution,
        path: Result<PathResolution, ResolutionError>,
    ) -> Result<Decision, ResolutionError> {
        if let Some(redirect) = self.subproject_to_main_domain(request, host)? {
            return Ok(Decision::Redirect(redirect));
        }

        let https_required = match host.method {
            ResolutionMethod::CustomDomain => host.domain.as_ref().is_some_and(|d| d.https),
            ResolutionMethod::PublicSubdomain => false,
            ResolutionMethod::Header => false,
        };
        if https_required && !request.is_https() {
            return Ok(Decision::Redirect(Redirect {
                location: location("https", &host.hostname, request.path, request.query),
                reason: RedirectReason::Https,
            }));
        }

        if host.method == ResolutionMethod::PublicSubdomain {
            let canonical = self
                .lookup
                .get_domains(&host.tenant.slug)
                .into_iter()
                .find(|d| d.canonical && d.https);
            if let Some(domain) = canonical {
                return Ok(Decision::Redirect(Redirect {
                    location: location("https", &domain.hostname, request.path, request.query),
                    reason: RedirectReason::CanonicalDomain,
                }));
            }
            if self.settings.public_domain_uses_https && !request.is_https() {
                return Ok(Decision::Redirect(Redirect {
                    location: location("https", &host.hostname, request.path, request.query),
                    reason: RedirectReason::Https,
                }));
            }
        }

        match path? {
            PathResolution::NeedsRedirect { path } => Ok(Decision::Redirect(Redirect {
                location: location(request.scheme, &host.hostname, &path, request.query),
                reason: RedirectReason::PathCompletion,
            })),
            PathResolution::Resolved(resolved) => Ok(Decision::Proceed(resolved)),
        }
    }

    fn subproject_to_main_domain(
        &self,
        request: RequestTarget<'_>,
        host: &HostResolution,
    ) -> Result<Option<Redirect>, ResolutionError> {
        if host.method == ResolutionMethod::Header {
            return Ok(None);
        }
        let Some((parent, alias)) = self.lookup.parent_of(&host.tenant.slug) else {
            return Ok(None);
        };

        let pattern = self.cache.subproject_pattern(&parent).map_err(|e| {
            tracing::warn!(project = %parent.slug, error = %e, "Subproject pattern failed at request time");
            ResolutionError::NotFound(e.to_string())
        })?;
        let path = mount_path(&pattern, &alias, request.path).map_err(|e| ResolutionError::NotFound(e.to_string()))?;

        let (scheme, hostname) = tenant_origin(self.lookup, self.settings, &parent);
        Ok(Some(Redirect {
            location: location(scheme, &hostname, &path, request.query),
            reason: RedirectReason::SubprojectToMainDomain,
        }))
    }
}

/// Scheme and host a tenant is served from: its canonical domain, or its
/// public subdomain.
pub(crate) fn tenant_origin<L: TenantLookup + ?Sized>(
    lookup: &L,
    settings: &RoutingConfig,
    tenant: &Tenant,
) -> (&'static str, String) {
    match lookup.canonical_domain(&tenant.slug) {
        Some(domain) => (domain.scheme(), domain.hostname),
        None => {
            let scheme = if settings.public_domain_uses_https { "https" } else { "http" };
            (scheme, format!("{}.{}", tenant.slug, settings.public_domain))
        }
    }
}

/// Absolute URL for a redirect target.
pub(crate) fn location(scheme: &str, hostname: &str, path: &str, query: Option<&str>) -> String {
    match Url::parse(&format!("{scheme}://{hostname}")) {
        Ok(mut url) => {
            url.set_path(path);
            url.set_query(query.filter(|q| !q.is_empty()));
            url.to_string()
        }
        Err(e) => {
            tracing::debug!(host = %hostname, error = %e, "Host is not a valid URL authority");
            match query {
                Some(q) if !q.is_empty() => format!("{scheme}://{hostname}{path}?{q}"),
                _ => format!("{scheme}://{hostname}{path}"),
            }
        }
    }
}
