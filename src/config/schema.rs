//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the docs
//! router. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

use crate::model::{Domain, SubprojectMount, Tenant, VersionDescriptor};
use crate::store::TenantStore;
use crate::versions::{CalendarFallback, SortStrategy};

/// Root configuration for the docs router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DocsConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Host and header settings used by request resolution.
    pub routing: RoutingConfig,

    /// Where resolved requests are served from.
    pub content: ContentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub tenants: Vec<TenantConfig>,

    pub domains: Vec<Domain>,
}

impl DocsConfig {
    /// Build the tenant store this configuration describes.
    pub fn build_store(&self) -> TenantStore {
        let mut store = TenantStore::new();
        for tenant in &self.tenants {
            store.insert_tenant(tenant.to_tenant(), tenant.versions.clone());
        }
        for domain in &self.domains {
            store.insert_domain(domain.clone());
        }
        store
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Content backend connect timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
        }
    }
}

/// Settings shared by host resolution and URL building.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Wildcard domain tenants are served under as `{slug}.{public_domain}`.
    pub public_domain: String,

    /// Public subdomains are served over https.
    pub public_domain_uses_https: bool,

    /// Trusted header naming a tenant directly. Only honoured for tenants
    /// with `resolve_from_header`.
    pub slug_header: String,

    /// Header carrying the client-facing scheme, set by the TLS terminator.
    pub forwarded_proto_header: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            public_domain: "docs.localhost".to_string(),
            public_domain_uses_https: false,
            slug_header: "x-docs-slug".to_string(),
            forwarded_proto_header: "x-forwarded-proto".to_string(),
        }
    }
}

/// Content backend configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Backend address (e.g., "127.0.0.1:3000"). When unset the resolution
    /// itself is returned as JSON.
    pub backend: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A tenant ("project") definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenantConfig {
    pub slug: String,

    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default = "default_version")]
    pub default_version: String,

    #[serde(default)]
    pub single_version: bool,

    /// Custom document pattern, replacing the default shape.
    #[serde(default)]
    pub url_pattern: Option<String>,

    /// Custom subproject mount pattern, replacing `/projects/{subproject}/`.
    #[serde(default)]
    pub subproject_url_pattern: Option<String>,

    #[serde(default)]
    pub custom_prefix: Option<String>,

    #[serde(default)]
    pub custom_subproject_prefix: Option<String>,

    /// Slug of the tenant this one translates.
    #[serde(default)]
    pub main_locale_tenant: Option<String>,

    #[serde(default)]
    pub translations: Vec<String>,

    #[serde(default)]
    pub subprojects: Vec<SubprojectMount>,

    #[serde(default)]
    pub resolve_from_header: bool,

    #[serde(default)]
    pub version_sorting: SortStrategy,

    #[serde(default)]
    pub calendar_fallback: CalendarFallback,

    #[serde(default = "default_pin")]
    pub pin_latest_stable: bool,

    #[serde(default)]
    pub versions: Vec<VersionDescriptor>,
}

impl TenantConfig {
    pub fn to_tenant(&self) -> Tenant {
        Tenant {
            slug: self.slug.clone(),
            default_locale: self.default_locale.clone(),
            default_version: self.default_version.clone(),
            single_version: self.single_version,
            url_pattern: self.url_pattern.clone(),
            subproject_url_pattern: self.subproject_url_pattern.clone(),
            custom_prefix: self.custom_prefix.clone(),
            custom_subproject_prefix: self.custom_subproject_prefix.clone(),
            main_locale_tenant: self.main_locale_tenant.clone(),
            translations: self.translations.clone(),
            subprojects: self.subprojects.clone(),
            resolve_from_header: self.resolve_from_header,
            version_sorting: self.version_sorting,
            calendar_fallback: self.calendar_fallback,
            pin_latest_stable: self.pin_latest_stable,
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_version() -> String {
    "latest".to_string()
}

fn default_pin() -> bool {
    true
}
