//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderMap;
use docs_router::config::{parse_config, DocsConfig};
use docs_router::routing::{DocRouter, InboundRequest, Outcome, PatternCache, SeenHosts};
use docs_router::store::TenantStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const PUBLIC_DOMAIN: &str = "docs.test";

/// A platform exercising every resolution feature.
pub const FIXTURE: &str = r#"
[routing]
public_domain = "docs.test"

[observability]
metrics_enabled = false

[[tenants]]
slug = "pip"
translations = ["pip-ja"]

[[tenants.subprojects]]
alias = "api"
tenant = "pip-api"

[[tenants.versions]]
slug = "2.0"
[[tenants.versions]]
slug = "1.12"
[[tenants.versions]]
slug = "1.2"
[[tenants.versions]]
slug = "1.0"
[[tenants.versions]]
slug = "z-slug"
[[tenants.versions]]
slug = "a-slug"
[[tenants.versions]]
slug = "stable"
[[tenants.versions]]
slug = "latest"
[[tenants.versions]]
slug = "preview"
hidden = true

[[tenants]]
slug = "pip-ja"
default_locale = "ja"
main_locale_tenant = "pip"

[[tenants]]
slug = "pip-api"
default_version = "stable"

[[tenants]]
slug = "parent"
subproject_url_pattern = "/s/{subproject}(/{filename})?"

[[tenants.subprojects]]
alias = "subproject"
tenant = "subproject"

[[tenants]]
slug = "subproject"

[[tenants]]
slug = "bare"
subproject_url_pattern = "/s/{subproject}"

[[tenants.subprojects]]
alias = "api"
tenant = "bare-api"

[[tenants]]
slug = "bare-api"
default_version = "stable"

[[tenants]]
slug = "custom"
url_pattern = "/{version}/{language}/{filename}"

[[tenants]]
slug = "single"
single_version = true

[[tenants]]
slug = "prefixed"
custom_prefix = "/docs/"

[[tenants]]
slug = "opted"
resolve_from_header = true

[[tenants]]
slug = "secure"

[[tenants]]
slug = "plaincanon"

[[domains]]
hostname = "subproject.example.com"
tenant = "subproject"
canonical = true
https = true

[[domains]]
hostname = "docs.secure.org"
tenant = "secure"
canonical = true
https = true

[[domains]]
hostname = "old.secure.org"
tenant = "secure"

[[domains]]
hostname = "docs.plaincanon.org"
tenant = "plaincanon"
canonical = true
"#;

pub fn config() -> DocsConfig {
    parse_config(FIXTURE).expect("fixture config is valid")
}

pub fn router_for(config: &DocsConfig) -> DocRouter<TenantStore> {
    DocRouter::new(
        Arc::new(config.build_store()),
        config.routing.clone(),
        Arc::new(PatternCache::new()),
        Arc::new(SeenHosts::new()),
    )
}

pub fn router() -> DocRouter<TenantStore> {
    router_for(&config())
}

/// Resolve `url` (absolute, e.g. `http://pip.docs.test/en/latest/`).
pub fn resolve_url(router: &DocRouter<TenantStore>, url: &str, headers: &HeaderMap) -> Outcome {
    let url = url::Url::parse(url).expect("test URL parses");
    let host = match url.port() {
        Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
        None => url.host_str().unwrap_or_default().to_string(),
    };
    router.resolve_request(&InboundRequest {
        scheme: url.scheme(),
        host: &host,
        path: url.path(),
        query: url.query(),
        headers,
    })
}

pub fn resolve(router: &DocRouter<TenantStore>, url: &str) -> Outcome {
    resolve_url(router, url, &HeaderMap::new())
}

/// Start a content backend answering every request with its request line
/// and the `x-docs-tenant` header it received.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();
                let request_line = head.lines().next().unwrap_or_default().to_string();
                let tenant = head
                    .lines()
                    .find_map(|l| l.strip_prefix("x-docs-tenant: "))
                    .unwrap_or("none")
                    .to_string();
                let body = format!("{request_line}\n{tenant}");
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
