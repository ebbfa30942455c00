//! Request resolution entry points.
//!
//! # Responsibilities
//! - `resolve_request`: host → path → redirect policy → outcome
//! - `build_url`: the reverse direction, tenant + version + locale + file → URL
//! - `order_versions`: version lists for navigation, per tenant defaults
//!
//! # Design Decisions
//! - Outcomes are values; nothing here panics or returns early through `?`
//!   across a component boundary
//! - The router is cheap to clone and holds only shared handles
//! - The pattern cache is injected so it can outlive configuration reloads

use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Serialize;
use thiserror::Error;

use super::cache::PatternCache;
use super::error::ResolutionError;
use super::host::{HostResolver, SeenHosts};
use super::pattern::PatternError;
use super::redirect::{self, Decision, Redirect, RedirectPolicy, RequestTarget};
use super::unresolver::{complete_path, mount_path, PathResolver, ResolvedPath};
use crate::config::RoutingConfig;
use crate::model::{ResolutionMethod, VersionDescriptor, Tenant};
use crate::observability::metrics;
use crate::store::TenantLookup;
use crate::versions::{visible_versions, SortStrategy, VersionOrderer};

/// An inbound request, as far as routing is concerned.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'r> {
    /// `http` or `https`, as seen by the client.
    pub scheme: &'r str,
    pub host: &'r str,
    pub path: &'r str,
    pub query: Option<&'r str>,
    pub headers: &'r HeaderMap,
}

/// A request resolved down to the content to serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub tenant: String,
    pub effective_tenant: String,
    pub subproject: Option<String>,
    pub locale: String,
    pub version_slug: String,
    pub filename: String,
    pub resolution_method: ResolutionMethod,
}

impl ResolutionResult {
    fn new(resolved: ResolvedPath, method: ResolutionMethod) -> Self {
        Self {
            tenant: resolved.tenant.slug.clone(),
            effective_tenant: resolved.effective_tenant.slug.clone(),
            subproject: resolved.subproject,
            locale: resolved.locale,
            version_slug: resolved.version,
            filename: resolved.filename,
            resolution_method: method,
        }
    }
}

/// Final answer for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Proceed(ResolutionResult),
    Redirect(Redirect),
    Error(ResolutionError),
}

impl Outcome {
    /// Stable label used in metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Proceed(_) => "proceed",
            Outcome::Redirect(_) => "redirect",
            Outcome::Error(e) => e.kind(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildUrlError {
    #[error("unknown project `{0}`")]
    UnknownTenant(String),

    #[error("project `{tenant}` is mounted under `{parent}`, which is missing")]
    MissingParent { tenant: String, parent: String },

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("cannot build URL: {0}")]
    Resolution(#[from] ResolutionError),
}

/// Request router over a tenant lookup.
pub struct DocRouter<L: TenantLookup> {
    lookup: Arc<L>,
    settings: RoutingConfig,
    cache: Arc<PatternCache>,
    seen: Arc<SeenHosts>,
}

impl<L: TenantLookup> Clone for DocRouter<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            settings: self.settings.clone(),
            cache: Arc::clone(&self.cache),
            seen: Arc::clone(&self.seen),
        }
    }
}

impl<L: TenantLookup> DocRouter<L> {
    pub fn new(lookup: Arc<L>, settings: RoutingConfig, cache: Arc<PatternCache>, seen: Arc<SeenHosts>) -> Self {
        Self {
            lookup,
            settings,
            cache,
            seen,
        }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn settings(&self) -> &RoutingConfig {
        &self.settings
    }

    pub fn seen_hosts(&self) -> &SeenHosts {
        &self.seen
    }

    /// Resolve an inbound request to content, a redirect or an error.
    pub fn resolve_request(&self, request: &InboundRequest<'_>) -> Outcome {
        let lookup = self.lookup.as_ref();

        let host = match HostResolver::new(lookup, &self.settings, &self.seen).resolve(request.host, request.headers) {
            Ok(host) => host,
            Err(e) => {
                tracing::debug!(host = %request.host, error = %e, "Host did not resolve");
                metrics::record_resolution("error", "none");
                return Outcome::Error(e);
            }
        };

        let path = PathResolver::new(lookup, &self.cache).resolve(&host.tenant, request.path);
        let target = RequestTarget {
            scheme: request.scheme,
            path: request.path,
            query: request.query,
        };
        let outcome = match RedirectPolicy::new(lookup, &self.settings, &self.cache).decide(target, &host, path) {
            Ok(Decision::Proceed(resolved)) => {
                tracing::debug!(
                    host = %host.hostname,
                    path = %request.path,
                    tenant = %resolved.tenant.slug,
                    effective_tenant = %resolved.effective_tenant.slug,
                    version = %resolved.version,
                    method = %host.method,
                    "Request resolved"
                );
                Outcome::Proceed(ResolutionResult::new(resolved, host.method))
            }
            Ok(Decision::Redirect(redirect)) => {
                tracing::info!(
                    host = %host.hostname,
                    path = %request.path,
                    tenant = %host.tenant.slug,
                    location = %redirect.location,
                    reason = %redirect.reason,
                    "Redirecting request"
                );
                metrics::record_redirect(redirect.reason.as_str());
                Outcome::Redirect(redirect)
            }
            Err(e) => {
                tracing::debug!(host = %host.hostname, path = %request.path, error = %e, "Path did not resolve");
                Outcome::Error(e)
            }
        };
        metrics::record_resolution(outcome.label(), host.method.as_str());
        outcome
    }

    /// Absolute URL of a document.
    ///
    /// Missing values fall back to the tenant's defaults. Translations are
    /// addressed through their main tenant's host and patterns, subprojects
    /// through their parent's.
    pub fn build_url(
        &self,
        tenant: &str,
        version: Option<&str>,
        locale: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String, BuildUrlError> {
        let lookup = self.lookup.as_ref();
        let tenant = lookup
            .get_tenant(tenant)
            .ok_or_else(|| BuildUrlError::UnknownTenant(tenant.to_string()))?;

        let owner = match &tenant.main_locale_tenant {
            Some(main) => lookup.get_tenant(main).ok_or_else(|| BuildUrlError::MissingParent {
                tenant: tenant.slug.clone(),
                parent: main.clone(),
            })?,
            None => Arc::clone(&tenant),
        };

        let pattern = self.cache.document_pattern(&owner)?;
        let mut path = complete_path(
            &pattern,
            locale.unwrap_or(&tenant.default_locale),
            version.unwrap_or(&tenant.default_version),
            filename.unwrap_or_default(),
        )?;

        let mut origin_tenant = owner;
        if let Some((parent, alias)) = lookup.parent_of(&origin_tenant.slug) {
            let mount = self.cache.subproject_pattern(&parent)?;
            path = mount_path(&mount, &alias, &path)?;
            origin_tenant = parent;
        }

        let (scheme, hostname) = redirect::tenant_origin(lookup, &self.settings, &origin_tenant);
        Ok(redirect::location(scheme, &hostname, &path, None))
    }

    /// Order `versions` for `tenant`. `strategy` and `pin` override the
    /// tenant's own settings.
    pub fn order_versions(
        &self,
        tenant: &Tenant,
        versions: Vec<VersionDescriptor>,
        strategy: Option<SortStrategy>,
        pin: Option<bool>,
    ) -> Vec<VersionDescriptor> {
        VersionOrderer::new(strategy.unwrap_or(tenant.version_sorting))
            .calendar_fallback(tenant.calendar_fallback)
            .pin_latest_stable(pin.unwrap_or(tenant.pin_latest_stable))
            .sort(versions)
    }

    /// The versions a navigation menu lists for `tenant`, in display order.
    pub fn flyout_versions(&self, tenant: &str) -> Option<Vec<VersionDescriptor>> {
        let tenant = self.lookup.get_tenant(tenant)?;
        let versions = visible_versions(self.lookup.get_versions(&tenant.slug));
        Some(self.order_versions(&tenant, versions, None, None))
    }
}
