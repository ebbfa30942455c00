use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use docs_router::config::load_config;
use docs_router::routing::{DocRouter, InboundRequest, Outcome, PatternCache, SeenHosts};
use docs_router::store::{TenantLookup, TenantStore};
use docs_router::versions::{visible_versions, SortStrategy};

#[derive(Parser)]
#[command(name = "docs-cli")]
#[command(about = "Offline resolution tools for docs-router configurations", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "docs-router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a URL the way the server would
    Resolve {
        url: String,
        /// Send the trusted slug header with this value
        #[arg(long)]
        slug_header: Option<String>,
    },
    /// Build the URL of a document
    Url {
        tenant: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        file: Option<String>,
    },
    /// List a project's versions in navigation order
    Versions {
        tenant: String,
        /// semver, alphabetical, python-packaging or calendar
        #[arg(long)]
        strategy: Option<SortStrategy>,
        #[arg(long)]
        no_pin: bool,
        /// Include hidden, inactive and unbuilt versions
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let router = DocRouter::new(
        Arc::new(config.build_store()),
        config.routing.clone(),
        Arc::new(PatternCache::new()),
        Arc::new(SeenHosts::new()),
    );

    let output = match cli.command {
        Commands::Resolve { url, slug_header } => resolve(&router, &url, slug_header.as_deref())?,
        Commands::Url {
            tenant,
            version,
            lang,
            file,
        } => {
            let url = router.build_url(&tenant, version.as_deref(), lang.as_deref(), file.as_deref())?;
            json!({ "url": url })
        }
        Commands::Versions {
            tenant,
            strategy,
            no_pin,
            all,
        } => {
            let project = router
                .lookup()
                .get_tenant(&tenant)
                .ok_or_else(|| format!("unknown project `{tenant}`"))?;
            let mut versions = router.lookup().get_versions(&tenant);
            if !all {
                versions = visible_versions(versions);
            }
            let pin = if no_pin { Some(false) } else { None };
            let ordered = router.order_versions(&project, versions, strategy, pin);
            serde_json::to_value(ordered)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resolve(
    router: &DocRouter<TenantStore>,
    raw: &str,
    slug_header: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let url = url::Url::parse(raw)?;
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => return Err(format!("`{raw}` has no host").into()),
    };

    let mut headers = HeaderMap::new();
    if let Some(slug) = slug_header {
        let name = HeaderName::from_bytes(router.settings().slug_header.as_bytes())?;
        headers.insert(name, HeaderValue::from_str(slug)?);
    }

    let outcome = router.resolve_request(&InboundRequest {
        scheme: url.scheme(),
        host: &host,
        path: url.path(),
        query: url.query(),
        headers: &headers,
    });

    Ok(match outcome {
        Outcome::Proceed(result) => json!({ "outcome": "proceed", "resolution": result }),
        Outcome::Redirect(redirect) => json!({
            "outcome": "redirect",
            "status": redirect.status().as_u16(),
            "location": redirect.location,
            "reason": redirect.reason.as_str(),
        }),
        Outcome::Error(e) => json!({
            "outcome": "error",
            "status": e.status_code().as_u16(),
            "message": e.to_string(),
        }),
    })
}
