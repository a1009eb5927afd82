//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::store::ConfigStore;

enum WatchMessage {
    Event(notify::Result<Event>),
    Stop,
}

/// Watches the directory holding the config file and reloads the store when
/// that file changes.
///
/// Events are handled on a dedicated thread. [`FileWatcher::stop`] blocks
/// until that thread has exited, after which no further reload can happen.
pub struct FileWatcher {
    watcher: Option<RecommendedWatcher>,
    control: Sender<WatchMessage>,
    worker: Option<JoinHandle<()>>,
}

impl FileWatcher {
    /// Start watching the file behind `store`.
    pub fn spawn(store: Arc<ConfigStore>) -> Result<Self, notify::Error> {
        let target = resolve(store.path());
        let directory = watch_directory(&target);

        let (tx, rx) = mpsc::channel();
        let events = tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = events.send(WatchMessage::Event(res));
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        let worker = thread::Builder::new()
            .name("config-watcher".to_string())
            .spawn(move || run(store, target, rx))
            .map_err(notify::Error::io)?;

        tracing::info!(path = %directory.display(), "Config watcher started");

        Ok(Self {
            watcher: Some(watcher),
            control: tx,
            worker: Some(worker),
        })
    }

    /// Whether the background thread is still alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Stop watching and wait for the background thread to finish.
    ///
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        // Dropping the OS watcher first means no new events get queued.
        drop(self.watcher.take());

        if let Some(worker) = self.worker.take() {
            let _ = self.control.send(WatchMessage::Stop);
            if worker.join().is_err() {
                tracing::error!("Config watcher thread panicked");
            }
            tracing::info!("Config watcher stopped");
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(store: Arc<ConfigStore>, target: PathBuf, rx: Receiver<WatchMessage>) {
    while let Ok(message) = rx.recv() {
        let mut pending = match message {
            WatchMessage::Stop => return,
            WatchMessage::Event(res) => is_relevant(res, &target),
        };

        // Coalesce whatever else is already queued into a single reload.
        loop {
            match rx.try_recv() {
                Ok(WatchMessage::Stop) => return,
                Ok(WatchMessage::Event(res)) => pending |= is_relevant(res, &target),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        if pending {
            tracing::info!("Config file change detected, reloading...");
            // Failures are logged by the store; the old snapshot stays current.
            let _ = store.reload();
        }
    }
}

fn is_relevant(res: notify::Result<Event>, target: &Path) -> bool {
    match res {
        Ok(event) => {
            (event.kind.is_modify() || event.kind.is_create())
                && event.paths.iter().any(|path| resolve(path) == target)
        }
        Err(e) => {
            tracing::error!("Watch error: {:?}", e);
            false
        }
    }
}

/// Absolute, symlink-free form of `path` where possible.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    // The file itself may be mid-replace; resolve the directory instead.
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|dir| dir.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

fn watch_directory(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
