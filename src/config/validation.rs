//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (domains, translations and subprojects
//!   reference existing tenants)
//! - Enforce the tenant invariants: translations and subprojects do not own
//!   patterns, subprojects are not nested
//! - Compile every URL pattern, so template mistakes never reach requests
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DocsConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::{DocsConfig, TenantConfig};
use crate::routing::{PatternCache, PatternError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("duplicate project slug `{0}`")]
    DuplicateTenant(String),

    #[error("duplicate domain `{0}`")]
    DuplicateDomain(String),

    #[error("{context} references unknown project `{slug}`")]
    UnknownTenant { context: String, slug: String },

    #[error("translation `{0}` cannot set `url_pattern` or `custom_prefix`")]
    TranslationOwnsPattern(String),

    #[error("subproject `{0}` cannot set `subproject_url_pattern` or `custom_subproject_prefix`")]
    SubprojectOwnsPattern(String),

    #[error("subproject `{0}` cannot have subprojects of its own")]
    NestedSubproject(String),

    #[error("project `{tenant}` mounts alias `{alias}` more than once")]
    DuplicateAlias { tenant: String, alias: String },

    #[error("project `{tenant}`: {source}")]
    Pattern { tenant: String, source: PatternError },
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &DocsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_settings(config, &mut errors);

    let mut slugs = HashSet::new();
    for tenant in &config.tenants {
        if !slugs.insert(tenant.slug.as_str()) {
            errors.push(ValidationError::DuplicateTenant(tenant.slug.clone()));
        }
    }

    let mut hostnames = HashSet::new();
    for domain in &config.domains {
        if !hostnames.insert(domain.hostname.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateDomain(domain.hostname.clone()));
        }
        if !slugs.contains(domain.tenant.as_str()) {
            errors.push(ValidationError::UnknownTenant {
                context: format!("domain `{}`", domain.hostname),
                slug: domain.tenant.clone(),
            });
        }
    }

    // subproject slug → parent slug
    let mut parents: HashMap<&str, &str> = HashMap::new();
    for tenant in &config.tenants {
        for mount in &tenant.subprojects {
            parents.insert(mount.tenant.as_str(), tenant.slug.as_str());
        }
    }

    let cache = PatternCache::new();
    for tenant in &config.tenants {
        validate_tenant(tenant, &slugs, &parents, &cache, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_settings(config: &DocsConfig, errors: &mut Vec<ValidationError>) {
    let mut invalid = |field: &'static str, reason: String| {
        errors.push(ValidationError::InvalidSetting { field, reason });
    };

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        invalid("listener.bind_address", format!("`{}` is not a socket address", config.listener.bind_address));
    }
    if config.listener.max_connections == 0 {
        invalid("listener.max_connections", "must be greater than zero".to_string());
    }
    if config.timeouts.request_secs == 0 {
        invalid("timeouts.request_secs", "must be greater than zero".to_string());
    }
    let public_domain = config.routing.public_domain.trim_matches('.');
    if public_domain.is_empty() || public_domain.contains(['/', ':', ' ']) {
        invalid("routing.public_domain", format!("`{}` is not a hostname", config.routing.public_domain));
    }
    for (field, value) in [
        ("routing.slug_header", &config.routing.slug_header),
        ("routing.forwarded_proto_header", &config.routing.forwarded_proto_header),
    ] {
        if HeaderName::from_bytes(value.as_bytes()).is_err() {
            invalid(field, format!("`{value}` is not a header name"));
        }
    }
    if let Some(backend) = &config.content.backend {
        if backend.parse::<axum::http::uri::Authority>().is_err() {
            invalid("content.backend", format!("`{backend}` is not a host:port address"));
        }
    }
    if config.observability.metrics_enabled && config.observability.metrics_address.parse::<SocketAddr>().is_err() {
        invalid(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        );
    }
}

fn validate_tenant(
    tenant: &TenantConfig,
    slugs: &HashSet<&str>,
    parents: &HashMap<&str, &str>,
    cache: &PatternCache,
    errors: &mut Vec<ValidationError>,
) {
    let mut reference = |context: String, slug: &str| {
        if !slugs.contains(slug) {
            errors.push(ValidationError::UnknownTenant {
                context,
                slug: slug.to_string(),
            });
        }
    };

    if let Some(main) = &tenant.main_locale_tenant {
        reference(format!("main_locale_tenant of `{}`", tenant.slug), main);
    }
    for translation in &tenant.translations {
        reference(format!("translations of `{}`", tenant.slug), translation);
    }
    for mount in &tenant.subprojects {
        reference(format!("subprojects of `{}`", tenant.slug), &mount.tenant);
    }

    if tenant.main_locale_tenant.is_some() && (tenant.url_pattern.is_some() || tenant.custom_prefix.is_some()) {
        errors.push(ValidationError::TranslationOwnsPattern(tenant.slug.clone()));
    }

    if parents.contains_key(tenant.slug.as_str()) {
        if tenant.subproject_url_pattern.is_some() || tenant.custom_subproject_prefix.is_some() {
            errors.push(ValidationError::SubprojectOwnsPattern(tenant.slug.clone()));
        }
        if !tenant.subprojects.is_empty() {
            errors.push(ValidationError::NestedSubproject(tenant.slug.clone()));
        }
    }

    let mut aliases = HashSet::new();
    for mount in &tenant.subprojects {
        if !aliases.insert(mount.alias.as_str()) {
            errors.push(ValidationError::DuplicateAlias {
                tenant: tenant.slug.clone(),
                alias: mount.alias.clone(),
            });
        }
    }

    if tenant.url_pattern.is_some() && tenant.custom_prefix.is_some() {
        tracing::warn!(project = %tenant.slug, "custom_prefix is ignored when url_pattern is set");
    }

    let model = tenant.to_tenant();
    let document = cache.document_pattern(&model);
    let subproject = cache.subproject_pattern(&model);
    for result in [document, subproject] {
        if let Err(source) = result {
            errors.push(ValidationError::Pattern {
                tenant: tenant.slug.clone(),
                source,
            });
        }
    }
}
