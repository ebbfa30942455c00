//! Calendar version slugs (`YYYY.MM.DD`).

use once_cell::sync::Lazy;
use regex::Regex;

static CALVER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<year>[0-9]{4})[-._](?<month>0?[1-9]|1[0-2])[-._](?<day>0?[1-9]|[12][0-9]|3[01])$")
        .expect("calver regex is valid")
});

/// A date decoded from a version slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub fn parse(slug: &str) -> Option<Self> {
        let caps = CALVER_REGEX.captures(slug)?;
        Some(Self {
            year: caps["year"].parse().ok()?,
            month: caps["month"].parse().ok()?,
            day: caps["day"].parse().ok()?,
        })
    }
}
