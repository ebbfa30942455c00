//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - The parent directory is watched, not the file: editors that save by
//!   writing a temporary file and renaming it replace the watched inode
//! - Only events naming the configuration file trigger a reload
//! - An invalid file never reaches the server; the last good
//!   configuration stays in place

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::DocsConfig;

/// Monitors the configuration file and publishes validated updates.
#[derive(Debug, Clone)]
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DocsConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DocsConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Load the file and publish it if it validates.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = load_config(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            tenants = config.tenants.len(),
            domains = config.domains.len(),
            "Configuration reloaded"
        );
        if self.update_tx.send(config).is_err() {
            tracing::debug!("Configuration receiver dropped");
        }
        Ok(())
    }

    /// Whether `event` is a write to the configuration file.
    fn is_relevant(&self, event: &Event) -> bool {
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return false;
        }
        let Some(name) = self.path.file_name() else {
            return false;
        };
        event.paths.iter().any(|p| p.file_name() == Some(name))
    }

    fn handle(&self, result: notify::Result<Event>) {
        match result {
            Ok(event) if self.is_relevant(&event) => {
                if let Err(e) = self.reload() {
                    tracing::error!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to reload config, keeping current configuration"
                    );
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "Watch error"),
        }
    }

    /// Start watching. The returned watcher must be kept alive for updates
    /// to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let handler = self.clone();
        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| handler.handle(result),
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Config watcher started");
        Ok(watcher)
    }
}
