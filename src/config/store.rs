//! Shared configuration state.
//!
//! `ConfigStore` owns the current [`ConfigSnapshot`] and the listeners that
//! react to a reload. Readers get an `Arc` to an immutable snapshot; the only
//! writer is [`ConfigStore::reload`].

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use arc_swap::ArcSwap;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::Settings;

/// Error a change listener may report. Logged by the store, never propagated.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Listener = Box<dyn Fn(&ConfigSnapshot) -> Result<(), ListenerError> + Send + Sync>;

/// One validated configuration together with where and when it was read.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub settings: Settings,
    pub source: PathBuf,
    pub loaded_at: SystemTime,
    /// Starts at 0 for the initial load, incremented on every successful reload.
    pub generation: u64,
}

impl ConfigSnapshot {
    /// Read and validate `path` into a snapshot.
    pub fn load(path: &Path, generation: u64) -> Result<Self, ConfigError> {
        let settings = load_config(path)?;
        Ok(Self {
            settings,
            source: path.to_path_buf(),
            loaded_at: SystemTime::now(),
            generation,
        })
    }
}

/// Holder of the current configuration snapshot.
pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<ConfigSnapshot>,
    listeners: Mutex<Vec<Listener>>,
    /// Serializes reloads, covering both the swap and listener dispatch.
    reload_lock: Mutex<()>,
}

impl ConfigStore {
    /// Load the initial snapshot. Fails if the file is missing or invalid.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let snapshot = ConfigSnapshot::load(&path, 0)?;

        tracing::info!(
            path = %path.display(),
            mode = %snapshot.settings.mode,
            "Configuration loaded"
        );

        Ok(Self {
            path,
            current: ArcSwap::from_pointee(snapshot),
            listeners: Mutex::new(Vec::new()),
            reload_lock: Mutex::new(()),
        })
    }

    /// Path of the file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The latest successfully loaded snapshot.
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Add a callback run after every successful reload, in registration order.
    pub fn register_listener<F>(&self, listener: F)
    where
        F: Fn(&ConfigSnapshot) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    /// Re-read the file and, on success, swap the snapshot and notify listeners.
    ///
    /// On failure the previous snapshot stays current and no listener runs.
    /// The file is re-read unconditionally, so reloading an unchanged file
    /// still produces a new snapshot and notifies listeners again.
    pub fn reload(&self) -> Result<Arc<ConfigSnapshot>, ConfigError> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = self.current.load().generation + 1;
        let snapshot = match ConfigSnapshot::load(&self.path, generation) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to reload config. Keeping current configuration."
                );
                return Err(e);
            }
        };

        self.current.store(snapshot.clone());
        tracing::info!(
            path = %self.path.display(),
            mode = %snapshot.settings.mode,
            generation,
            "Configuration reloaded"
        );

        self.notify(&snapshot);
        Ok(snapshot)
    }

    fn notify(&self, snapshot: &ConfigSnapshot) {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);

        for (index, listener) in listeners.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(snapshot))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(listener = index, error = %e, "Config listener failed");
                }
                Err(_) => {
                    tracing::error!(listener = index, "Config listener panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("generation", &self.current.load().generation)
            .finish_non_exhaustive()
    }
}
