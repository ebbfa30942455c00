//! Path → (subproject, locale, version, filename) resolution.
//!
//! # Data Flow
//! ```text
//! (addressed tenant, path)
//!     → owner: the main-locale tenant when the addressed one is a translation
//!     → subproject stage (owner's mount pattern, alias then slug)
//!         → candidate = subproject, path = captured suffix
//!     → document stage (candidate's document pattern)
//!         → language → effective tenant (self or one translation)
//!         → version  → captured or effective tenant default
//!     → Resolved | NeedsRedirect(completed path) | NotFound
//! ```
//!
//! # Design Decisions
//! - Custom patterns replace the defaults; there is no fallback to the
//!   default shape once a tenant sets its own
//! - Subprojects are resolved in one step: a mounted tenant's own mounts are
//!   never consulted
//! - An incomplete path is redirected to the same path with defaults filled,
//!   unless that completed path is the request path itself
//! - Resolved filenames always start with `/`

use std::collections::HashMap;
use std::sync::Arc;

use super::cache::PatternCache;
use super::error::ResolutionError;
use super::pattern::{CompiledPattern, Field, PatternError};
use crate::model::Tenant;
use crate::store::TenantLookup;

/// A fully resolved document request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Tenant the request was addressed to.
    pub tenant: Arc<Tenant>,
    /// Tenant whose content is served: the addressed tenant, one of its
    /// translations, or a subproject (or its translation).
    pub effective_tenant: Arc<Tenant>,
    /// Alias of the subproject the path went through, if any.
    pub subproject: Option<String>,
    pub locale: String,
    pub version: String,
    pub filename: String,
}

/// Result of resolving a path that matched a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    Resolved(ResolvedPath),
    /// Valid but incomplete; `path` is the completed form on the same host.
    NeedsRedirect { path: String },
}

/// Resolves request paths against a tenant's patterns.
pub struct PathResolver<'a, L: TenantLookup + ?Sized> {
    lookup: &'a L,
    cache: &'a PatternCache,
}

impl<'a, L: TenantLookup + ?Sized> PathResolver<'a, L> {
    pub fn new(lookup: &'a L, cache: &'a PatternCache) -> Self {
        Self { lookup, cache }
    }

    pub fn resolve(&self, tenant: &Arc<Tenant>, path: &str) -> Result<PathResolution, ResolutionError> {
        let owner = self.owner_of(tenant)?;

        if !owner.subprojects.is_empty() {
            if let Some(resolution) = self.resolve_subproject(tenant, &owner, path)? {
                return Ok(resolution);
            }
        }

        self.resolve_document(tenant, &owner, tenant, path)
    }

    /// Translations share the patterns and translation set of their main
    /// tenant.
    fn owner_of(&self, tenant: &Arc<Tenant>) -> Result<Arc<Tenant>, ResolutionError> {
        match &tenant.main_locale_tenant {
            None => Ok(Arc::clone(tenant)),
            Some(main) => self.lookup.get_tenant(main).ok_or_else(|| {
                ResolutionError::NotFound(format!("main project `{main}` of `{}` is missing", tenant.slug))
            }),
        }
    }

    /// Returns `None` when the path is not a subproject path of `owner`.
    fn resolve_subproject(
        &self,
        tenant: &Arc<Tenant>,
        owner: &Arc<Tenant>,
        path: &str,
    ) -> Result<Option<PathResolution>, ResolutionError> {
        let pattern = self.cache.subproject_pattern(owner).map_err(pattern_failure)?;
        let Some(matched) = pattern.match_path(path) else {
            return Ok(None);
        };
        let Some(name) = matched.get(Field::Subproject) else {
            return Ok(None);
        };
        let Some(mount) = owner.find_subproject(name) else {
            tracing::debug!(project = %owner.slug, subproject = %name, "Unknown subproject, trying document pattern");
            return Ok(None);
        };
        let sub = self.lookup.get_tenant(&mount.tenant).ok_or_else(|| {
            ResolutionError::NotFound(format!("subproject `{}` is missing", mount.tenant))
        })?;
        let sub_owner = self.owner_of(&sub)?;

        if !pattern.has_field(Field::Filename) && !path.ends_with('/') {
            return Ok(Some(PathResolution::NeedsRedirect {
                path: format!("{path}/"),
            }));
        }

        if !pattern.has_field(Field::Filename) {
            // A mount without a filename slot addresses only the subproject's
            // default page.
            return Ok(Some(PathResolution::Resolved(ResolvedPath {
                tenant: Arc::clone(tenant),
                locale: sub.default_locale.clone(),
                version: sub.default_version.clone(),
                filename: "/".to_string(),
                effective_tenant: sub,
                subproject: Some(mount.alias.clone()),
            })));
        }

        let suffix = format!("/{}", matched.get(Field::Filename).unwrap_or_default());
        let resolution = match self.resolve_document(&sub, &sub_owner, &sub, &suffix)? {
            PathResolution::Resolved(mut resolved) => {
                resolved.tenant = Arc::clone(tenant);
                resolved.subproject = Some(mount.alias.clone());
                PathResolution::Resolved(resolved)
            }
            PathResolution::NeedsRedirect { path: inner } => PathResolution::NeedsRedirect {
                path: mount_path(&pattern, &mount.alias, &inner).map_err(pattern_failure)?,
            },
        };
        Ok(Some(resolution))
    }

    /// Resolve `path` against the document pattern of `owner`.
    ///
    /// `addressed` supplies the defaults when the path carries no language:
    /// the host tenant, or the subproject the path went through.
    fn resolve_document(
        &self,
        tenant: &Arc<Tenant>,
        owner: &Arc<Tenant>,
        addressed: &Arc<Tenant>,
        path: &str,
    ) -> Result<PathResolution, ResolutionError> {
        let pattern = self.cache.document_pattern(owner).map_err(pattern_failure)?;

        let at_root = path == pattern.static_prefix() || format!("{path}/") == pattern.static_prefix();
        if at_root {
            let target = complete_path(&pattern, &addressed.default_locale, &addressed.default_version, "")?;
            if target != path {
                return Ok(PathResolution::NeedsRedirect { path: target });
            }
        }

        let matched = pattern
            .match_path(path)
            .ok_or_else(|| ResolutionError::NotFound(format!("no page at `{path}`")))?;

        let language = matched.get(Field::Language);
        let effective = match language {
            Some(language) => self.translation_for(owner, language)?,
            None => Arc::clone(addressed),
        };
        // Languages match case-insensitively; the served locale is always the
        // effective tenant's own spelling.
        let locale = effective.default_locale.as_str();
        let version = matched.get(Field::Version).unwrap_or(&effective.default_version);
        let filename = matched.get(Field::Filename);

        let incomplete = pattern.fields().iter().any(|f| matched.get(*f).is_none())
            || (!pattern.has_field(Field::Filename) && !path.ends_with('/'))
            || language.is_some_and(|language| language != locale);
        if incomplete {
            let target = complete_path(&pattern, locale, version, filename.unwrap_or_default())?;
            if target != path {
                return Ok(PathResolution::NeedsRedirect { path: target });
            }
        }

        Ok(PathResolution::Resolved(ResolvedPath {
            tenant: Arc::clone(tenant),
            locale: locale.to_string(),
            version: version.to_string(),
            filename: format!("/{}", filename.unwrap_or_default()),
            effective_tenant: effective,
            subproject: None,
        }))
    }

    /// The tenant serving `language` for `owner`: itself or exactly one of
    /// its translations.
    fn translation_for(&self, owner: &Arc<Tenant>, language: &str) -> Result<Arc<Tenant>, ResolutionError> {
        if owner.default_locale.eq_ignore_ascii_case(language) {
            return Ok(Arc::clone(owner));
        }
        let mut candidates = owner
            .translations
            .iter()
            .filter_map(|slug| self.lookup.get_tenant(slug))
            .filter(|t| t.default_locale.eq_ignore_ascii_case(language));
        match (candidates.next(), candidates.next()) {
            (Some(translation), None) => Ok(translation),
            (Some(_), Some(_)) => {
                tracing::warn!(project = %owner.slug, language = %language, "Several translations share a language");
                Err(ResolutionError::NotFound(format!("ambiguous language `{language}`")))
            }
            (None, _) => Err(ResolutionError::NotFound(format!(
                "no `{language}` translation of `{}`",
                owner.slug
            ))),
        }
    }
}

/// The canonical form of a document path, trailing slash enforced when the
/// pattern has no filename.
pub(crate) fn complete_path(
    pattern: &CompiledPattern,
    language: &str,
    version: &str,
    filename: &str,
) -> Result<String, ResolutionError> {
    let mut values = HashMap::new();
    values.insert(Field::Language, language);
    values.insert(Field::Version, version);
    values.insert(Field::Filename, filename.trim_start_matches('/'));
    let mut target = pattern.reverse(&values).map_err(pattern_failure)?;
    if !pattern.has_field(Field::Filename) && !target.ends_with('/') {
        target.push('/');
    }
    Ok(target)
}

/// Path of `suffix` under a subproject mounted as `alias`. Mounts without a
/// filename slot drop the suffix and end in a slash.
pub(crate) fn mount_path(pattern: &CompiledPattern, alias: &str, suffix: &str) -> Result<String, PatternError> {
    let mut values = HashMap::new();
    values.insert(Field::Subproject, alias);
    values.insert(Field::Filename, suffix.trim_start_matches('/'));
    let mut target = pattern.reverse(&values)?;
    if !pattern.has_field(Field::Filename) && !target.ends_with('/') {
        target.push('/');
    }
    Ok(target)
}

/// Patterns are validated at load time; a failure here is a configuration
/// bug and is served as a 404.
fn pattern_failure(err: PatternError) -> ResolutionError {
    tracing::warn!(error = %err, "URL pattern failed at request time");
    ResolutionError::NotFound(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubprojectMount;
    use crate::store::TenantStore;

    fn fixture() -> TenantStore {
        let mut store = TenantStore::new();

        let mut pip = Tenant::new("pip");
        pip.translations = vec!["pip-ja".into()];
        pip.subprojects = vec![SubprojectMount {
            alias: "api".into(),
            tenant: "pip-api".into(),
        }];
        store.insert_tenant(pip, Vec::new());

        let mut ja = Tenant::new("pip-ja");
        ja.default_locale = "ja".into();
        ja.main_locale_tenant = Some("pip".into());
        store.insert_tenant(ja, Vec::new());

        let mut api = Tenant::new("pip-api");
        api.default_version = "stable".into();
        store.insert_tenant(api, Vec::new());

        let mut single = Tenant::new("single");
        single.single_version = true;
        store.insert_tenant(single, Vec::new());

        let mut custom = Tenant::new("custom");
        custom.url_pattern = Some("/{version}/{language}/{filename}".into());
        store.insert_tenant(custom, Vec::new());

        store
    }

    fn resolve(store: &TenantStore, slug: &str, path: &str) -> Result<PathResolution, ResolutionError> {
        let cache = PatternCache::new();
        let tenant = store.get_tenant(slug).unwrap();
        PathResolver::new(store, &cache).resolve(&tenant, path)
    }

    fn resolved(store: &TenantStore, slug: &str, path: &str) -> ResolvedPath {
        match resolve(store, slug, path) {
            Ok(PathResolution::Resolved(r)) => r,
            other => panic!("{path}: expected resolution, got {other:?}"),
        }
    }

    fn redirect(store: &TenantStore, slug: &str, path: &str) -> String {
        match resolve(store, slug, path) {
            Ok(PathResolution::NeedsRedirect { path }) => path,
            other => panic!("{path}: expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_default_pattern() {
        let store = fixture();
        let r = resolved(&store, "pip", "/en/1.0/guide/install.html");
        assert_eq!(r.effective_tenant.slug, "pip");
        assert_eq!((r.locale.as_str(), r.version.as_str()), ("en", "1.0"));
        assert_eq!(r.filename, "/guide/install.html");

        assert_eq!(resolved(&store, "pip", "/en/latest/").filename, "/");
    }

    #[test]
    fn test_incomplete_paths_redirect() {
        let store = fixture();
        assert_eq!(redirect(&store, "pip", "/"), "/en/latest/");
        assert_eq!(redirect(&store, "pip", "/en"), "/en/latest/");
        assert_eq!(redirect(&store, "pip", "/en/"), "/en/latest/");
        assert_eq!(redirect(&store, "pip", "/en/1.0"), "/en/1.0/");
        assert_eq!(redirect(&store, "pip", "/ja/1.0"), "/ja/1.0/");
    }

    #[test]
    fn test_translations() {
        let store = fixture();
        let r = resolved(&store, "pip", "/ja/latest/");
        assert_eq!(r.tenant.slug, "pip");
        assert_eq!(r.effective_tenant.slug, "pip-ja");
        assert_eq!(r.locale, "ja");

        assert!(matches!(
            resolve(&store, "pip", "/fr/latest/"),
            Err(ResolutionError::NotFound(_))
        ));
    }

    #[test]
    fn test_translation_addressed_directly() {
        let store = fixture();
        assert_eq!(redirect(&store, "pip-ja", "/"), "/ja/latest/");
        let r = resolved(&store, "pip-ja", "/en/latest/index.html");
        assert_eq!(r.tenant.slug, "pip-ja");
        assert_eq!(r.effective_tenant.slug, "pip");
    }

    #[test]
    fn test_subprojects() {
        let store = fixture();
        let r = resolved(&store, "pip", "/projects/api/en/2.0/ref.html");
        assert_eq!(r.tenant.slug, "pip");
        assert_eq!(r.effective_tenant.slug, "pip-api");
        assert_eq!(r.subproject.as_deref(), Some("api"));
        assert_eq!(r.filename, "/ref.html");

        // slug fallback
        let r = resolved(&store, "pip", "/projects/pip-api/en/2.0/");
        assert_eq!(r.subproject.as_deref(), Some("api"));

        assert_eq!(redirect(&store, "pip", "/projects/api"), "/projects/api/en/stable/");
        assert_eq!(redirect(&store, "pip", "/projects/api/"), "/projects/api/en/stable/");
        assert_eq!(redirect(&store, "pip", "/projects/api/en"), "/projects/api/en/stable/");

        assert!(matches!(
            resolve(&store, "pip", "/projects/unknown/en/latest/"),
            Err(ResolutionError::NotFound(_))
        ));
    }

    #[test]
    fn test_single_version() {
        let store = fixture();
        let r = resolved(&store, "single", "/");
        assert_eq!((r.version.as_str(), r.filename.as_str()), ("latest", "/"));
        assert_eq!(resolved(&store, "single", "/en/latest/a.html").filename, "/en/latest/a.html");
    }

    #[test]
    fn test_custom_pattern_replaces_default() {
        let store = fixture();
        let r = resolved(&store, "custom", "/latest/en/");
        assert_eq!((r.locale.as_str(), r.version.as_str()), ("en", "latest"));
        assert!(matches!(
            resolve(&store, "custom", "/en/latest/"),
            Err(ResolutionError::NotFound(_))
        ));
        assert_eq!(redirect(&store, "custom", "/"), "/latest/en/");
    }

    #[test]
    fn test_custom_subproject_pattern() {
        let mut store = fixture();
        let mut parent = Tenant::new("parent");
        parent.subproject_url_pattern = Some("/s/{subproject}(/{filename})?".into());
        parent.subprojects = vec![SubprojectMount {
            alias: "subproject".into(),
            tenant: "pip-api".into(),
        }];
        store.insert_tenant(parent, Vec::new());

        let r = resolved(&store, "parent", "/s/subproject/en/latest/");
        assert_eq!(r.effective_tenant.slug, "pip-api");
        assert_eq!(redirect(&store, "parent", "/s/subproject"), "/s/subproject/en/stable/");
        assert!(matches!(
            resolve(&store, "parent", "/projects/subproject/en/latest/"),
            Err(ResolutionError::NotFound(_))
        ));
    }

    #[test]
    fn test_mount_without_filename_serves_subproject_root() {
        let mut store = fixture();
        let mut parent = Tenant::new("parent");
        parent.subproject_url_pattern = Some("/s/{subproject}".into());
        parent.subprojects = vec![SubprojectMount {
            alias: "api".into(),
            tenant: "pip-api".into(),
        }];
        store.insert_tenant(parent, Vec::new());

        assert_eq!(redirect(&store, "parent", "/s/api"), "/s/api/");
        let r = resolved(&store, "parent", "/s/api/");
        assert_eq!(r.tenant.slug, "parent");
        assert_eq!(r.effective_tenant.slug, "pip-api");
        assert_eq!(r.subproject.as_deref(), Some("api"));
        assert_eq!((r.locale.as_str(), r.version.as_str()), ("en", "stable"));
        assert_eq!(r.filename, "/");
    }

    #[test]
    fn test_language_case_is_canonicalised() {
        let store = fixture();
        assert_eq!(redirect(&store, "pip", "/EN/latest/"), "/en/latest/");
        assert_eq!(redirect(&store, "pip", "/Ja/1.0/a.html"), "/ja/1.0/a.html");
        assert_eq!(resolved(&store, "pip", "/ja/1.0/a.html").locale, "ja");
    }
}
