//! The orchestrator: owns configuration, the active backend and the watcher.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::{ConfigError, ConfigSnapshot, ConfigStore, FileWatcher, ListenerError, Mode};
use crate::error::{Error, Result};
use crate::observability::LoggingContext;
use crate::orchestrator::mode::{resolve_mode, ResolvedMode, MODE_ENV_VAR};
use crate::weather::{WeatherBackend, WeatherReport, WeatherResult};

/// Startup inputs for [`Orchestrator::start`].
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub config_path: PathBuf,
    pub cli_mode: Option<String>,
    pub env_mode: Option<String>,
}

impl OrchestratorOptions {
    /// Options for `config_path`, with the environment override read from
    /// `URA_MODE`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            cli_mode: None,
            env_mode: std::env::var(MODE_ENV_VAR).ok(),
        }
    }

    pub fn with_cli_mode(mut self, mode: Option<String>) -> Self {
        self.cli_mode = mode;
        self
    }

    pub fn with_env_mode(mut self, mode: Option<String>) -> Self {
        self.env_mode = mode;
        self
    }
}

/// The mode and the backend built for it. Always swapped as one unit.
#[derive(Debug)]
pub struct ActiveBackend {
    pub mode: Mode,
    pub backend: WeatherBackend,
    /// Generation of the snapshot this backend was built from.
    pub generation: u64,
}

/// State shared with the reload listener.
struct Wiring {
    active: ArcSwap<ActiveBackend>,
    logging: Arc<LoggingContext>,
}

impl Wiring {
    /// Rebuild the backend for `mode`, retarget logging, then swap.
    ///
    /// Nothing changes if the backend cannot be built.
    fn apply(&self, mode: Mode, snapshot: &ConfigSnapshot) -> Result<()> {
        let active = build_active(&self.logging, mode, snapshot)?;
        self.active.store(Arc::new(active));
        tracing::info!(mode = %mode, generation = snapshot.generation, "Orchestrator applied mode");
        Ok(())
    }
}

fn build_active(
    logging: &LoggingContext,
    mode: Mode,
    snapshot: &ConfigSnapshot,
) -> Result<ActiveBackend> {
    let backend = WeatherBackend::build(mode, &snapshot.settings.weather)?;
    logging
        .apply(&snapshot.settings.logging)
        .map_err(Error::Logging)?;
    Ok(ActiveBackend {
        mode,
        backend,
        generation: snapshot.generation,
    })
}

/// Central controller: resolves the mode, keeps the backend in step with
/// the config file and serves weather requests.
pub struct Orchestrator {
    store: Arc<ConfigStore>,
    wiring: Arc<Wiring>,
    startup_mode: ResolvedMode,
    watcher: Mutex<Option<FileWatcher>>,
}

impl Orchestrator {
    /// Load configuration, resolve and apply the mode, and start watching
    /// the config file. Any failure here is fatal.
    pub fn start(options: OrchestratorOptions, logging: Arc<LoggingContext>) -> Result<Self> {
        let store = Arc::new(ConfigStore::open(&options.config_path)?);
        let snapshot = store.current();

        let startup_mode = resolve_mode(
            options.cli_mode.as_deref(),
            options.env_mode.as_deref(),
            snapshot.settings.mode,
        )?;

        let active = build_active(&logging, startup_mode.mode, &snapshot)?;
        tracing::info!(mode = %active.mode, "Orchestrator applied mode");
        let wiring = Arc::new(Wiring {
            active: ArcSwap::from_pointee(active),
            logging,
        });

        // Reloads apply the file's mode as-is; the CLI/ENV override only
        // decides the startup mode.
        let listener_wiring = wiring.clone();
        store.register_listener(move |snapshot| {
            let mode = snapshot.settings.mode;
            tracing::info!(mode = %mode, "Config reloaded, applying");
            listener_wiring.apply(mode, snapshot).map_err(|e| {
                tracing::warn!(error = %e, "Keeping previous mode and backend");
                ListenerError::from(e)
            })
        });

        let watcher = FileWatcher::spawn(store.clone())?;

        Ok(Self {
            store,
            wiring,
            startup_mode,
            watcher: Mutex::new(Some(watcher)),
        })
    }

    /// Current effective mode.
    pub fn mode(&self) -> Mode {
        self.wiring.active.load().mode
    }

    /// How the mode was chosen at startup.
    pub fn startup_mode(&self) -> ResolvedMode {
        self.startup_mode
    }

    /// The active mode/backend pair.
    pub fn active(&self) -> Arc<ActiveBackend> {
        self.wiring.active.load_full()
    }

    /// Latest configuration snapshot.
    pub fn config(&self) -> Arc<ConfigSnapshot> {
        self.store.current()
    }

    pub fn config_store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn logging(&self) -> &Arc<LoggingContext> {
        &self.wiring.logging
    }

    /// Reload the config file now, as the watcher would.
    pub fn reload(&self) -> std::result::Result<Arc<ConfigSnapshot>, ConfigError> {
        self.store.reload()
    }

    /// Fetch weather for `location` from the active backend.
    ///
    /// The backend is captured once at entry; a reload during the call does
    /// not affect it.
    pub async fn fetch_weather(&self, location: &str) -> WeatherResult<WeatherReport> {
        let active = self.active();
        tracing::info!(mode = %active.mode, location = %location, "fetch_weather invoked");

        let report = active.backend.fetch(location).await?;
        tracing::info!(source = %report.source, "fetch_weather completed");
        Ok(report)
    }

    /// Whether the config watcher is still running.
    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(FileWatcher::is_running)
    }

    /// Stop the config watcher, blocking until its thread has exited.
    ///
    /// Idempotent; also runs on drop.
    pub fn stop(&self) {
        let watcher = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(mut watcher) = watcher {
            watcher.stop();
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.stop();
    }
}
