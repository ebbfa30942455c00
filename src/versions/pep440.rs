//! PEP 440 version parsing and ordering.
//!
//! Follows the comparison rules of the Python packaging ecosystem:
//! `1.0.dev1 < 1.0a1 < 1.0b2 < 1.0rc1 < 1.0 < 1.0.post1`, release
//! segments compare numerically with trailing zeros ignored.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static PEP440_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?:-(?P<post_n1>[0-9]+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("pep440 regex is valid")
});

/// Pre-release phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    Candidate,
}

/// Orders missing segments relative to present ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Bound<T> {
    Low,
    Value(T),
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum LocalSegment {
    // Alphanumeric segments sort before numeric ones.
    Text(String),
    Number(u64),
}

/// A parsed PEP 440 version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pep440Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreRelease, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

impl Pep440Version {
    pub fn parse(s: &str) -> Option<Self> {
        let caps = PEP440_REGEX.captures(s)?;
        let number = |name: &str| -> Option<u64> {
            caps.name(name).and_then(|m| m.as_str().parse().ok())
        };

        let release = caps["release"]
            .split('.')
            .map(|part| part.parse().ok())
            .collect::<Option<Vec<u64>>>()?;

        let pre = caps.name("pre_l").map(|label| {
            let phase = match label.as_str().to_ascii_lowercase().as_str() {
                "a" | "alpha" => PreRelease::Alpha,
                "b" | "beta" => PreRelease::Beta,
                _ => PreRelease::Candidate,
            };
            (phase, number("pre_n").unwrap_or(0))
        });

        let post = if caps.name("post_n1").is_some() {
            number("post_n1")
        } else if caps.name("post_l").is_some() {
            Some(number("post_n2").unwrap_or(0))
        } else {
            None
        };

        let dev = caps
            .name("dev_l")
            .map(|_| number("dev_n").unwrap_or(0));

        let local = caps.name("local").map(|local| {
            local
                .as_str()
                .split(['-', '_', '.'])
                .map(|segment| match segment.parse() {
                    Ok(n) => LocalSegment::Number(n),
                    Err(_) => LocalSegment::Text(segment.to_ascii_lowercase()),
                })
                .collect()
        });

        Some(Self {
            epoch: number("epoch").unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    fn sort_key(&self) -> (u64, &[u64], Bound<(PreRelease, u64)>, Bound<u64>, Bound<u64>) {
        let mut release = self.release.as_slice();
        while let [rest @ .., 0] = release {
            release = rest;
        }

        // A bare dev release sorts before every pre-release of the same version.
        let pre = match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => Bound::Low,
            (None, _, _) => Bound::High,
            (Some(pre), _, _) => Bound::Value(pre),
        };
        let post = self.post.map_or(Bound::Low, Bound::Value);
        let dev = self.dev.map_or(Bound::High, Bound::Value);

        (self.epoch, release, pre, post, dev)
    }
}

impl PartialOrd for Pep440Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pep440Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.local.cmp(&other.local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Pep440Version {
        Pep440Version::parse(s).unwrap()
    }

    #[test]
    fn test_release_segments_compare_numerically() {
        assert!(v("1.12") > v("1.2"));
        assert!(v("2.0") > v("1.99.99"));
        assert_eq!(v("1.0").cmp(&v("1.0.0")), Ordering::Equal);
    }

    #[test]
    fn test_pre_post_dev_ordering() {
        let ordered = ["1.0.dev1", "1.0a1", "1.0a2", "1.0b1", "1.0rc1", "1.0", "1.0.post1", "1.1"];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_epoch_wins() {
        assert!(v("1!0.1") > v("2024.1"));
    }

    #[test]
    fn test_local_versions_sort_after_public() {
        assert!(v("1.0+local.1") > v("1.0"));
        assert!(v("1.0+2") > v("1.0+abc"));
    }

    #[test]
    fn test_non_versions_are_rejected() {
        assert!(Pep440Version::parse("latest").is_none());
        assert!(Pep440Version::parse("feature-branch").is_none());
    }
}
