//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which save by writing a temp file and renaming it over the
//! original keep triggering reloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::ConfigError;
use crate::config::schema::ProxyConfig;

/// Produces a fresh, validated config. Startup passes a loader that also
/// reapplies command-line overrides.
pub type Reload = Arc<dyn Fn() -> Result<ProxyConfig, ConfigError> + Send + Sync>;

/// Watches a config file and pushes reloaded configs onto a channel.
pub struct ConfigWatcher {
    path: PathBuf,
    reload: Reload,
    update_tx: mpsc::UnboundedSender<ProxyConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new<F>(path: &Path, reload: F) -> (Self, mpsc::UnboundedReceiver<ProxyConfig>)
    where
        F: Fn() -> Result<ProxyConfig, ConfigError> + Send + Sync + 'static,
    {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        (
            Self {
                path,
                reload: Arc::new(reload),
                update_tx,
            },
            update_rx,
        )
    }

    /// Run the reload once. Invalid configs are logged and not sent.
    pub fn reload_now(&self) -> bool {
        reload_and_send(&self.reload, &self.update_tx)
    }

    /// Start watching in notify's background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let target = self.path.clone();
        let reload = self.reload.clone();
        let tx = self.update_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &target) => {
                    tracing::info!(path = ?target, "Config file changed, reloading");
                    reload_and_send(&reload, &tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = self.path.parent().unwrap_or(Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn touches(event: &Event, target: &Path) -> bool {
    (event.kind.is_modify() || event.kind.is_create()) && event.paths.iter().any(|p| p == target)
}

fn reload_and_send(reload: &Reload, tx: &mpsc::UnboundedSender<ProxyConfig>) -> bool {
    match reload() {
        Ok(config) => tx.send(config).is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            false
        }
    }
}
