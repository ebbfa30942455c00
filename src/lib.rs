//! Multi-tenant documentation request routing.
//!
//! Resolves `(host, path)` to the tenant, version, locale and file to serve,
//! keeps URLs canonical through redirects, builds URLs in the reverse
//! direction, and orders version lists for navigation.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod routing;
pub mod store;
pub mod versions;

pub use config::DocsConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{DocRouter, InboundRequest, Outcome};
