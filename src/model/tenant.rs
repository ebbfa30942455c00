//! Documentation tenants ("projects").

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::versions::{CalendarFallback, SortStrategy};

/// Tenants refer to each other by slug.
pub type TenantRef = String;

/// Default path under which subprojects are mounted.
pub const DEFAULT_SUBPROJECT_PREFIX: &str = "/projects/";

/// A subproject mounted inside another tenant's URL space.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubprojectMount {
    /// Path segment the subproject is served under.
    pub alias: String,
    /// Slug of the mounted tenant.
    pub tenant: TenantRef,
}

/// A documentation project hosted by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tenant {
    pub slug: String,
    pub default_locale: String,
    pub default_version: String,
    pub single_version: bool,

    /// Custom document pattern, e.g. `/{version}/{language}/{filename}`.
    pub url_pattern: Option<String>,
    /// Custom subproject mount pattern, e.g. `/s/{subproject}/{filename}`.
    pub subproject_url_pattern: Option<String>,
    /// Literal prefix for the default document pattern.
    pub custom_prefix: Option<String>,
    /// Literal prefix for the default subproject pattern.
    pub custom_subproject_prefix: Option<String>,

    /// Set when this tenant is a translation of another one.
    pub main_locale_tenant: Option<TenantRef>,
    pub translations: Vec<TenantRef>,
    pub subprojects: Vec<SubprojectMount>,

    /// Opt-in for resolution through the trusted slug header.
    pub resolve_from_header: bool,

    pub version_sorting: SortStrategy,
    pub calendar_fallback: CalendarFallback,
    pub pin_latest_stable: bool,
}

impl Tenant {
    /// Create a multi-version tenant with `en`/`latest` defaults.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            default_locale: "en".to_string(),
            default_version: "latest".to_string(),
            single_version: false,
            url_pattern: None,
            subproject_url_pattern: None,
            custom_prefix: None,
            custom_subproject_prefix: None,
            main_locale_tenant: None,
            translations: Vec::new(),
            subprojects: Vec::new(),
            resolve_from_header: false,
            version_sorting: SortStrategy::default(),
            calendar_fallback: CalendarFallback::default(),
            pin_latest_stable: true,
        }
    }

    pub fn is_translation(&self) -> bool {
        self.main_locale_tenant.is_some()
    }

    /// Template used to resolve document paths of this tenant.
    ///
    /// A custom `url_pattern` replaces the default shape entirely; otherwise
    /// the default is built from `custom_prefix` and the versioning mode.
    pub fn document_template(&self) -> Cow<'_, str> {
        if let Some(pattern) = &self.url_pattern {
            return Cow::Borrowed(pattern);
        }
        let prefix = literal_prefix(self.custom_prefix.as_deref(), "/");
        if self.single_version {
            Cow::Owned(format!("{prefix}{{filename}}"))
        } else {
            Cow::Owned(format!("{prefix}{{language}}/{{version}}/{{filename}}"))
        }
    }

    /// Template used to mount this tenant's subprojects.
    pub fn subproject_template(&self) -> Cow<'_, str> {
        if let Some(pattern) = &self.subproject_url_pattern {
            return Cow::Borrowed(pattern);
        }
        let prefix = literal_prefix(
            self.custom_subproject_prefix.as_deref(),
            DEFAULT_SUBPROJECT_PREFIX,
        );
        Cow::Owned(format!("{prefix}{{subproject}}/{{filename}}"))
    }

    /// Find a mounted subproject, alias first, then by slug.
    pub fn find_subproject(&self, name: &str) -> Option<&SubprojectMount> {
        self.subprojects
            .iter()
            .find(|mount| mount.alias == name)
            .or_else(|| self.subprojects.iter().find(|mount| mount.tenant == name))
    }
}

/// Normalize a user supplied prefix into `/segment/.../` and escape it, since
/// templates are regex fragments.
fn literal_prefix(prefix: Option<&str>, default: &str) -> String {
    let raw = match prefix.map(|p| p.trim_matches('/')) {
        Some("") | None => return default.to_string(),
        Some(trimmed) => trimmed,
    };
    format!("/{}/", regex::escape(raw))
}
