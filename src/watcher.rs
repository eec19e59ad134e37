// src/watcher.rs
use crate::error::{Result, WatchError};
use crate::event::FileSystemEvent;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, trace, warn};

/// Capacity of the streams filled by the watcher's callback thread.
///
/// Kept at one so that a slow consumer blocks the backend thread rather than
/// letting events pile up.
const STREAM_CAPACITY: usize = 1;

/// Creates `dir` if it does not exist yet.
///
/// Only a single directory level is created, with mode `0o755` on Unix.
/// Returns `true` if the directory was created and `false` if it was already
/// present.
///
/// # Errors
///
/// Returns [`WatchError::CreateDir`] if the existence check or the creation
/// fails (missing parent, permission denied, ...).
pub async fn ensure_dir(dir: &Path) -> Result<bool> {
    match tokio::fs::metadata(dir).await {
        Ok(_) => {
            debug!("Directory already exists: {}", dir.display());
            return Ok(false);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(WatchError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(false);
    #[cfg(unix)]
    builder.mode(0o755);

    builder
        .create(dir)
        .await
        .map_err(|source| WatchError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    info!("Created directory: {}", dir.display());
    Ok(true)
}

/// The two streams a [`DirWatcher`] delivers into.
///
/// Both are closed once the watcher is closed and its backend has shut down.
#[derive(Debug)]
pub struct WatchStreams {
    /// Change events, one per affected path.
    pub events: Receiver<FileSystemEvent>,
    /// Errors reported by the backend after setup.
    pub errors: Receiver<WatchError>,
}

/// Registered roots as `(absolute, as given)` pairs.
///
/// Backends report absolute paths; events are rewritten under the path the
/// caller registered so a relative `./monitor` stays relative in the output.
type Roots = Arc<RwLock<Vec<(PathBuf, PathBuf)>>>;

/// A watch handle on the platform's file system notification backend.
pub struct DirWatcher {
    inner: RecommendedWatcher,
    watched: Vec<PathBuf>,
    roots: Roots,
}

impl DirWatcher {
    /// Creates a watch handle together with the streams it delivers into.
    ///
    /// The backend invokes the callback on its own thread; events are
    /// handed to the async side with `blocking_send`, one path at a time.
    pub fn new() -> Result<(Self, WatchStreams)> {
        let (event_tx, event_rx) = mpsc::channel(STREAM_CAPACITY);
        let (error_tx, error_rx) = mpsc::channel(STREAM_CAPACITY);
        let roots = Roots::default();

        let callback_roots = Arc::clone(&roots);
        let inner = RecommendedWatcher::new(
            move |result: notify::Result<notify::Event>| match result {
                Ok(event) => forward_event(event, &callback_roots, &event_tx),
                Err(e) => {
                    if error_tx.blocking_send(WatchError::Subsystem(e)).is_err() {
                        debug!("Error stream closed, dropping watcher error");
                    }
                }
            },
            Config::default(),
        )
        .map_err(WatchError::Watcher)?;

        let watcher = DirWatcher {
            inner,
            watched: Vec::new(),
            roots,
        };
        let streams = WatchStreams {
            events: event_rx,
            errors: error_rx,
        };
        Ok((watcher, streams))
    }

    /// Registers `path` for monitoring. Subdirectories are not watched.
    pub fn add(&mut self, path: &Path) -> Result<()> {
        let register_err = |source| WatchError::Register {
            path: path.to_path_buf(),
            source,
        };
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| register_err(notify::Error::io(e)))?
                .join(path)
        };
        // Recorded before watching so the first events are already rewritten.
        if let Ok(mut roots) = self.roots.write() {
            roots.push((absolute, path.to_path_buf()));
        }

        if let Err(source) = self.inner.watch(path, RecursiveMode::NonRecursive) {
            if let Ok(mut roots) = self.roots.write() {
                roots.pop();
            }
            return Err(register_err(source));
        }
        info!("Watching directory: {}", path.display());
        self.watched.push(path.to_path_buf());
        Ok(())
    }

    /// Paths registered so far.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Releases the handle. Unregistration failures are logged, not returned.
    pub fn close(mut self) {
        for path in std::mem::take(&mut self.watched) {
            if let Err(e) = self.inner.unwatch(&path) {
                warn!("Failed to unwatch {}: {}", path.display(), e);
            }
        }
        if let Ok(mut roots) = self.roots.write() {
            roots.clear();
        }
        debug!("Watcher closed");
    }
}

/// Rewrites `path` under the registered form of the root containing it.
fn as_registered(path: PathBuf, roots: &Roots) -> PathBuf {
    let Ok(roots) = roots.read() else {
        return path;
    };
    roots
        .iter()
        .find_map(|(absolute, given)| {
            path.strip_prefix(absolute)
                .ok()
                .map(|rest| given.join(rest))
        })
        .unwrap_or(path)
}

fn forward_event(mut event: notify::Event, roots: &Roots, event_tx: &Sender<FileSystemEvent>) {
    event.paths = event
        .paths
        .into_iter()
        .map(|p| as_registered(p, roots))
        .collect();

    let events = FileSystemEvent::from_notify(&event);
    if events.is_empty() {
        trace!("Ignoring event kind {:?} for {:?}", event.kind, event.paths);
    }
    for fs_event in events {
        trace!("Backend produced event: {:?}", fs_event);
        if let Err(e) = event_tx.blocking_send(fs_event) {
            debug!("Event stream closed, dropping event: {:?}", e.0);
            return;
        }
    }
}
