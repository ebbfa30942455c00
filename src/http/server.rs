//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all docs handler
//! - Wire up middleware (tracing, timeout, concurrency limit, request ID)
//! - Resolve every request through the current `DocRouter`
//! - Forward resolved requests to the content backend
//! - Swap the serving state on configuration updates

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ContentConfig, DocsConfig};
use crate::http::request::{request_host, request_id, request_scheme, MakeRequestUuid};
use crate::http::response::{outcome_response, resolution_json};
use crate::observability::metrics;
use crate::routing::{DocRouter, InboundRequest, Outcome, PatternCache, ResolutionResult, SeenHosts};
use crate::store::TenantStore;

/// Everything a request is served from. Replaced wholesale on reload.
pub struct ServingState {
    pub router: DocRouter<TenantStore>,
    pub content: ContentConfig,
}

impl ServingState {
    pub fn from_config(config: &DocsConfig, cache: Arc<PatternCache>, seen: Arc<SeenHosts>) -> Self {
        let store = Arc::new(config.build_store());
        Self {
            router: DocRouter::new(store, config.routing.clone(), cache, seen),
            content: config.content.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub serving: Arc<ArcSwap<ServingState>>,
    pub client: Client<HttpConnector, Body>,
    /// Outlives reloads; entries are keyed by immutable template text.
    pub cache: Arc<PatternCache>,
    pub seen: Arc<SeenHosts>,
}

impl AppState {
    /// Replace the serving state. In-flight requests keep the old one.
    pub fn reload(&self, config: &DocsConfig) {
        let state = ServingState::from_config(config, Arc::clone(&self.cache), Arc::clone(&self.seen));
        let tenants = state.router.lookup().tenant_count();
        self.serving.store(Arc::new(state));
        tracing::info!(tenants, "Serving state reloaded");
    }
}

/// HTTP server for the docs router.
pub struct HttpServer {
    router: Router,
    config: DocsConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DocsConfig) -> Self {
        let cache = Arc::new(PatternCache::new());
        let seen = Arc::new(SeenHosts::new());
        let serving = ServingState::from_config(&config, Arc::clone(&cache), Arc::clone(&seen));

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            serving: Arc::new(ArcSwap::from_pointee(serving)),
            client,
            cache,
            seen,
        };

        let router = Self::build_router(&config, state.clone());
        Self { router, config, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DocsConfig, state: AppState) -> Router {
        let x_request_id = HeaderName::from_static(crate::http::request::X_REQUEST_ID);
        Router::new()
            .route("/{*path}", any(docs_handler))
            .route("/", any(docs_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
    }

    /// The request router, for driving the server in-process.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Shared state, for applying configuration updates directly.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<DocsConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.reload(&config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the request, then redirect, fail, or serve the content.
async fn docs_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let serving = state.serving.load_full();

    let host = request_host(&request);
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let scheme = request_scheme(request.headers(), &serving.router.settings().forwarded_proto_header);
    let request_id = request_id(request.headers()).to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        host = %host,
        path = %path,
        "Resolving request"
    );

    let outcome = serving.router.resolve_request(&InboundRequest {
        scheme,
        host: &host,
        path: &path,
        query: query.as_deref(),
        headers: request.headers(),
    });

    let response = match (outcome, &serving.content.backend) {
        (Outcome::Proceed(result), Some(backend)) => {
            forward(&state.client, backend, request, &result, &request_id).await
        }
        (Outcome::Proceed(result), None) => resolution_json(result),
        (outcome, _) => outcome_response(outcome),
    };

    metrics::record_request(response.status().as_u16(), start_time);
    response
}

/// Forward a resolved request to the content backend.
async fn forward(
    client: &Client<HttpConnector, Body>,
    backend: &str,
    request: Request<Body>,
    result: &ResolutionResult,
    request_id: &str,
) -> Response {
    let target = format!(
        "http://{backend}/{}/{}{}",
        result.effective_tenant, result.version_slug, result.filename
    );
    let uri = match target.parse::<Uri>() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, target = %target, error = %e, "Invalid content URI");
            return (StatusCode::BAD_REQUEST, "Invalid document path").into_response();
        }
    };

    let (parts, body) = request.into_parts();
    let mut upstream = hyper::Request::builder().method(parts.method).uri(uri).version(parts.version);
    if let Some(headers) = upstream.headers_mut() {
        for (name, value) in parts.headers.iter() {
            if name != axum::http::header::HOST {
                headers.append(name.clone(), value.clone());
            }
        }
        for (name, value) in [
            ("x-docs-tenant", result.effective_tenant.as_str()),
            ("x-docs-version", result.version_slug.as_str()),
            ("x-docs-locale", result.locale.as_str()),
            ("x-docs-filename", result.filename.as_str()),
        ] {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        }
    }
    let upstream = match upstream.body(body) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build content request");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    match client.request(upstream).await {
        Ok(response) => relay(response),
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Content backend error");
            (StatusCode::BAD_GATEWAY, "Content backend unavailable").into_response()
        }
    }
}

/// Hand a content backend response back to the client, streaming the body.
fn relay(response: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    parts.headers.remove(hyper::header::CONNECTION);
    Response::from_parts(parts, Body::new(body))
}
