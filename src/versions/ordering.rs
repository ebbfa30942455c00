//! Version ordering strategies.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use super::calver::CalendarDate;
use super::pep440::Pep440Version;
use super::semver::parse_slug;
use crate::model::VersionDescriptor;

/// Slugs pinned to the front, in this order.
const PINNED_SLUGS: [&str; 2] = ["latest", "stable"];

/// How a tenant's version list is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    #[default]
    Semver,
    Alphabetical,
    PythonPackaging,
    Calendar,
}

impl std::str::FromStr for SortStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "semver" => Ok(SortStrategy::Semver),
            "alphabetical" => Ok(SortStrategy::Alphabetical),
            "python-packaging" => Ok(SortStrategy::PythonPackaging),
            "calendar" => Ok(SortStrategy::Calendar),
            other => Err(format!("unknown version sorting strategy: {other}")),
        }
    }
}

/// Comparator for calendar-strategy slugs that are not dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarFallback {
    /// Reverse string order over slugs that still parse as versions.
    #[default]
    Lexicographic,
    /// Semantic numeric order, as in the `semver` strategy.
    Semver,
}

/// Sorts version lists for a single strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionOrderer {
    strategy: SortStrategy,
    calendar_fallback: CalendarFallback,
    pin_latest_stable: bool,
}

impl VersionOrderer {
    pub fn new(strategy: SortStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn calendar_fallback(mut self, fallback: CalendarFallback) -> Self {
        self.calendar_fallback = fallback;
        self
    }

    pub fn pin_latest_stable(mut self, pin: bool) -> Self {
        self.pin_latest_stable = pin;
        self
    }

    /// Order `versions`, newest first.
    pub fn sort(&self, versions: Vec<VersionDescriptor>) -> Vec<VersionDescriptor> {
        let (mut pinned, rest): (Vec<_>, Vec<_>) = if self.pin_latest_stable {
            versions
                .into_iter()
                .partition(|v| PINNED_SLUGS.contains(&v.slug.as_str()))
        } else {
            (Vec::new(), versions)
        };
        pinned.sort_by_key(|v| PINNED_SLUGS.iter().position(|slug| *slug == v.slug));

        let sorted = match self.strategy {
            SortStrategy::Alphabetical => reverse_lexicographic(rest),
            SortStrategy::Semver => bucketed(rest, parse_slug),
            SortStrategy::PythonPackaging => bucketed(rest, Pep440Version::parse),
            SortStrategy::Calendar => self.calendar(rest),
        };

        pinned.extend(sorted);
        pinned
    }

    fn calendar(&self, versions: Vec<VersionDescriptor>) -> Vec<VersionDescriptor> {
        let (dates, rest): (Vec<_>, Vec<_>) = versions
            .into_iter()
            .partition(|v| CalendarDate::parse(&v.slug).is_some());

        let mut sorted = bucketed(dates, CalendarDate::parse);
        sorted.extend(match self.calendar_fallback {
            CalendarFallback::Semver => bucketed(rest, parse_slug),
            // Parseable slugs still go first, but compare as plain strings.
            CalendarFallback::Lexicographic => bucketed(rest, |slug| parse_slug(slug).map(|_| slug.to_string())),
        });
        sorted
    }
}

/// Order with the default calendar fallback.
pub fn sort_versions(
    versions: Vec<VersionDescriptor>,
    strategy: SortStrategy,
    pin_latest_stable: bool,
) -> Vec<VersionDescriptor> {
    VersionOrderer::new(strategy)
        .pin_latest_stable(pin_latest_stable)
        .sort(versions)
}

/// Keep only the versions a version picker should offer.
pub fn visible_versions(versions: Vec<VersionDescriptor>) -> Vec<VersionDescriptor> {
    versions.into_iter().filter(VersionDescriptor::is_listed).collect()
}

/// Parseable slugs by key descending, then unparseable slugs in reverse
/// string order. Ties on the key fall back to the slug so the order is total.
fn bucketed<K, F>(versions: Vec<VersionDescriptor>, parse: F) -> Vec<VersionDescriptor>
where
    K: Ord,
    F: Fn(&str) -> Option<K>,
{
    let mut parseable = Vec::new();
    let mut opaque = Vec::new();
    for version in versions {
        match parse(&version.slug) {
            Some(key) => parseable.push((key, version)),
            None => opaque.push(version),
        }
    }

    parseable.sort_by(|(a, va), (b, vb)| b.cmp(a).then_with(|| vb.slug.cmp(&va.slug)));

    let mut sorted: Vec<_> = parseable.into_iter().map(|(_, v)| v).collect();
    sorted.extend(reverse_lexicographic(opaque));
    sorted
}

fn reverse_lexicographic(mut versions: Vec<VersionDescriptor>) -> Vec<VersionDescriptor> {
    versions.sort_by_key(|v| Reverse(v.slug.clone()));
    versions
}
