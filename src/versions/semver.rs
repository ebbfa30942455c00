//! Lenient semantic version parsing for version slugs.
//!
//! Slugs are rarely full SemVer (`1.2`, `v2`, `1.0-rc1`), so missing
//! components are padded before handing off to the `semver` crate.

use once_cell::sync::Lazy;
use regex::Regex;
use semver::{Prerelease, Version};

static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[vV]?(?<major>[0-9]+)(?:\.(?<minor>[0-9]+))?(?:\.(?<patch>[0-9]+))?(?:[-.]?(?<pre>[a-zA-Z][0-9a-zA-Z.]*))?$")
        .expect("semver slug regex is valid")
});

/// Parse a slug such as `1.12`, `v2.0.1` or `1.0-rc1`.
pub fn parse_slug(slug: &str) -> Option<Version> {
    let caps = SLUG_REGEX.captures(slug)?;
    let number = |name: &str| -> Option<u64> {
        caps.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let mut version = Version::new(number("major")?, number("minor")?, number("patch")?);
    if let Some(pre) = caps.name("pre") {
        version.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    Some(version)
}
