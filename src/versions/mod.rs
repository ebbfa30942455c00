//! Version list ordering.
//!
//! # Data Flow
//! ```text
//! [VersionDescriptor] (from the tenant store)
//!     → visible_versions (optional flyout filter)
//!     → pinning: pull `latest` / `stable` aside
//!     → strategy: split parseable / unparseable slugs
//!         parseable   → strategy comparator, descending
//!         unparseable → reverse lexicographic, after parseable
//!     → pinned slugs reinserted at the front
//! ```
//!
//! # Strategies
//! - **semver** (default): dotted numeric, `1.12 > 1.2 > 1.0`
//! - **alphabetical**: reverse lexicographic over every slug
//! - **python-packaging**: PEP 440 release/pre/post/dev ordering
//! - **calendar**: `YYYY.MM.DD` dates first, then a configurable fallback

pub mod calver;
pub mod ordering;
pub mod pep440;
pub mod semver;

pub use ordering::{sort_versions, visible_versions, CalendarFallback, SortStrategy, VersionOrderer};
