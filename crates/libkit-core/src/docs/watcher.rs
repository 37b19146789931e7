//! Debounced file watching for doc regeneration

use crate::project::{DocsConfig, Project};
use anyhow::{Context, Result};
use colored::Colorize;
use notify::event::{MetadataKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Decides which changed paths should trigger a regeneration
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    extensions: Vec<String>,
    ignore: Vec<String>,
}

impl ChangeFilter {
    pub fn new(root: impl Into<PathBuf>, config: &DocsConfig) -> Self {
        Self {
            root: root.into(),
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            ignore: config.ignore.clone(),
        }
    }

    pub fn is_relevant(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);

        let ignored = rel.components().any(|component| match component {
            Component::Normal(name) => self.ignore.iter().any(|ignored| name == ignored.as_str()),
            _ => false,
        });
        if ignored {
            return false;
        }

        watched_extension(rel).is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// Extension of a path, treating dotfiles like `.env` as their own extension
fn watched_extension(path: &Path) -> Option<&str> {
    match path.extension() {
        Some(ext) => ext.to_str(),
        None => path.file_name()?.to_str()?.strip_prefix('.'),
    }
}

/// Whether an event changed the contents or names of files
///
/// Opening or reading a file is not a change. The generator reads every
/// watched file on each run.
pub fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Watches the configured project paths and reports batches of relevant changes
pub struct DocsWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<PathBuf>,
    debounce: Duration,
    watched: Vec<PathBuf>,
}

impl DocsWatcher {
    pub fn new(project: &Project) -> Result<Self> {
        let config = &project.config().docs;
        let filter = ChangeFilter::new(project.root(), config);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_content_change(&event.kind) => {
                for path in event.paths.into_iter().filter(|path| filter.is_relevant(path)) {
                    let _ = tx.send(path);
                }
            }
            Ok(_) => {}
            Err(e) => eprintln!("{} {}", "Watch error:".red(), e),
        })
        .context("Failed to start file watcher")?;

        let mut watched = Vec::new();
        for path in &config.watch {
            let full = project.root().join(path);
            if !full.exists() {
                continue;
            }
            let mode = if full.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher
                .watch(&full, mode)
                .with_context(|| format!("Failed to watch {}", full.display()))?;
            watched.push(full);
        }

        if watched.is_empty() {
            anyhow::bail!("None of the configured watch paths exist");
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            debounce: Duration::from_millis(config.debounce_ms),
            watched,
        })
    }

    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Wait for the next batch of relevant changes
    ///
    /// A batch closes once no further change arrives for the debounce period.
    /// Paths come back sorted and deduplicated.
    pub async fn next_batch(&mut self) -> Option<Vec<PathBuf>> {
        let first = self.receiver.recv().await?;
        let mut paths = BTreeSet::from([first]);

        while let Ok(Some(path)) = tokio::time::timeout(self.debounce, self.receiver.recv()).await {
            paths.insert(path);
        }

        Some(paths.into_iter().collect())
    }
}
