//! Version ordering through the router, using tenant defaults.

use docs_router::model::VersionDescriptor;
use docs_router::store::TenantLookup;
use docs_router::versions::SortStrategy;

mod common;

fn slugs(versions: Vec<VersionDescriptor>) -> Vec<String> {
    versions.into_iter().map(|v| v.slug).collect()
}

#[test]
fn test_semver_with_pinning() {
    let router = common::router();
    let tenant = router.lookup().get_tenant("pip").unwrap();
    let versions = router.lookup().get_versions("pip");

    let ordered = router.order_versions(&tenant, versions, Some(SortStrategy::Semver), Some(true));
    assert_eq!(
        slugs(ordered),
        ["latest", "stable", "2.0", "1.12", "1.2", "1.0", "z-slug", "preview", "a-slug"]
    );
}

#[test]
fn test_alphabetical_without_pinning() {
    let router = common::router();
    let tenant = router.lookup().get_tenant("pip").unwrap();
    let versions: Vec<_> = router
        .lookup()
        .get_versions("pip")
        .into_iter()
        .filter(|v| v.slug != "preview")
        .collect();

    let ordered = router.order_versions(&tenant, versions, Some(SortStrategy::Alphabetical), Some(false));
    assert_eq!(
        slugs(ordered),
        ["z-slug", "stable", "latest", "a-slug", "2.0", "1.2", "1.12", "1.0"]
    );
}

#[test]
fn test_flyout_hides_unlisted_versions() {
    let router = common::router();
    let ordered = router.flyout_versions("pip").unwrap();
    assert_eq!(
        slugs(ordered),
        ["latest", "stable", "2.0", "1.12", "1.2", "1.0", "z-slug", "a-slug"]
    );
}

#[test]
fn test_tenant_strategy_is_default() {
    let mut config = common::config();
    let pip = config.tenants.iter_mut().find(|t| t.slug == "pip").unwrap();
    pip.version_sorting = SortStrategy::Alphabetical;
    pip.pin_latest_stable = false;
    let router = common::router_for(&config);

    let ordered = router.flyout_versions("pip").unwrap();
    assert_eq!(ordered.first().map(|v| v.slug.as_str()), Some("z-slug"));
}
