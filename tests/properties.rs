//! Property tests: URL round-trips and partial-path completion.

use std::sync::Arc;

use docs_router::routing::{Outcome, PathResolution, PathResolver, PatternCache};
use docs_router::store::{TenantLookup, TenantStore};
use proptest::prelude::*;

mod common;

fn version() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9._-]{0,10}".prop_filter("no dot segments", |v| !v.contains(".."))
}

fn filename() -> impl Strategy<Value = String> {
    "([a-z0-9_-]{1,8}/){0,3}[a-z0-9_-]{1,8}\\.html"
}

fn locale() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![Just(("en", "pip")), Just(("ja", "pip-ja"))]
}

fn resolve_path(store: &TenantStore, cache: &PatternCache, tenant: &str, path: &str) -> PathResolution {
    let tenant = store.get_tenant(tenant).unwrap();
    PathResolver::new(store, cache)
        .resolve(&tenant, path)
        .unwrap_or_else(|e| panic!("{path} did not resolve: {e}"))
}

proptest! {
    #[test]
    fn prop_build_url_round_trips(version in version(), file in filename(), (lang, effective) in locale()) {
        let router = common::router();
        let url = router.build_url("pip", Some(&version), Some(lang), Some(&file)).unwrap();
        match common::resolve(&router, &url) {
            Outcome::Proceed(result) => {
                prop_assert_eq!(result.effective_tenant, effective);
                prop_assert_eq!(result.locale, lang);
                prop_assert_eq!(result.version_slug, version);
                prop_assert_eq!(result.filename, format!("/{file}"));
            }
            other => prop_assert!(false, "{} resolved to {:?}", url, other),
        }
    }

    #[test]
    fn prop_round_trips_through_custom_and_subproject_patterns(
        version in version(),
        file in filename(),
        tenant in prop_oneof![Just("custom"), Just("prefixed"), Just("pip-api"), Just("subproject")],
    ) {
        let router = common::router();
        let url = router.build_url(tenant, Some(&version), None, Some(&file)).unwrap();
        match common::resolve(&router, &url) {
            Outcome::Proceed(result) => {
                prop_assert_eq!(result.effective_tenant, tenant);
                prop_assert_eq!(result.version_slug, version);
                prop_assert_eq!(result.filename, format!("/{file}"));
            }
            other => prop_assert!(false, "{} resolved to {:?}", url, other),
        }
    }

    #[test]
    fn prop_truncated_paths_complete(version in version(), tenant in prop_oneof![Just("pip"), Just("custom"), Just("prefixed")]) {
        let config = common::config();
        let store = Arc::new(config.build_store());
        let cache = PatternCache::new();
        let router = common::router_for(&config);

        let url = router.build_url(tenant, Some(&version), None, None).unwrap();
        let canonical = url::Url::parse(&url).unwrap().path().to_string();
        prop_assert!(canonical.ends_with('/'));

        // Cut at every field boundary, trailing slash stripped.
        let trimmed = canonical.trim_end_matches('/');
        let mut cuts: Vec<&str> = trimmed.match_indices('/').map(|(i, _)| &trimmed[..i]).collect();
        cuts.push(trimmed);

        for cut in cuts.into_iter().filter(|c| !c.is_empty()) {
            match resolve_path(&store, &cache, tenant, cut) {
                PathResolution::NeedsRedirect { path } => {
                    if cut == trimmed {
                        prop_assert_eq!(&path, &canonical);
                    }
                    let completed = resolve_path(&store, &cache, tenant, &path);
                    prop_assert!(matches!(completed, PathResolution::Resolved(_)), "{} -> {}", cut, path);
                }
                PathResolution::Resolved(_) => prop_assert!(false, "{} resolved without completion", cut),
            }
        }
    }
}
