//! docs-router: multi-tenant documentation request router.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                   DOCS ROUTER                    │
//!                    │                                                  │
//!   Client Request   │  ┌────────┐   ┌──────────────────────────────┐   │
//!   ─────────────────┼─▶│  http  │──▶│           routing            │   │
//!                    │  │ server │   │ host → path → redirect policy│   │
//!                    │  └───┬────┘   └──────────────┬───────────────┘   │
//!                    │      │                       │                   │
//!                    │      │     Redirect / Error  │ Proceed           │
//!   Client Response  │      ▼                       ▼                   │
//!   ◀────────────────┼── response ◀──────── content backend ◀──────────┼── Content
//!                    │                                                  │   Server
//!                    │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ │
//!                    │  │ config  │ │  store  │ │ versions │ │observa-│ │
//!                    │  │+ reload │ │         │ │          │ │ bility │ │
//!                    │  └─────────┘ └─────────┘ └──────────┘ └────────┘ │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "docs-router", version, about = "Multi-tenant documentation request router")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    docs_router::lifecycle::startup::run(args.config.as_deref()).await?;
    Ok(())
}
