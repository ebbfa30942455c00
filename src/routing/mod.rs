//! Request resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (scheme, host, path, query, headers)
//!     → host.rs       (tenant + resolution method, no path parsing)
//!     → unresolver.rs (subproject, locale, version, filename)
//!     → redirect.rs   (canonical domain, scheme, path completion)
//!     → router.rs     Outcome: Proceed | Redirect | Error
//!
//! Pattern Compilation (lazily, once per template):
//!     tenant template
//!     → pattern.rs (validate fields, wrap optional segments, compile)
//!     → cache.rs   (shared, never evicted)
//! ```
//!
//! # Design Decisions
//! - Every stage is a pure function over the tenant lookup
//! - The only shared mutable state is the pattern cache and seen-host log
//! - Deterministic: same input and configuration, same outcome

pub mod cache;
pub mod error;
pub mod host;
pub mod pattern;
pub mod redirect;
pub mod router;
pub mod unresolver;

pub use cache::PatternCache;
pub use error::ResolutionError;
pub use host::{HostResolution, HostResolver, SeenHosts};
pub use pattern::{CompiledPattern, Field, PatternError, PatternKind};
pub use redirect::{Redirect, RedirectReason};
pub use router::{BuildUrlError, DocRouter, InboundRequest, Outcome, ResolutionResult};
pub use unresolver::{PathResolution, PathResolver, ResolvedPath};
