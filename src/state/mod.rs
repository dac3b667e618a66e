// State management module
//
// Provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::models::{AppState, LogEntry, LogLevel, TaskKind};
use camino::Utf8PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// The GUI subscribes to these instead of polling the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The game directory selection has been updated
    ConfigurationChanged { is_game_dir_configured: bool },

    /// An install or update task has started
    TaskStarted { task: TaskKind },

    /// The running task has finished (successfully or not)
    TaskFinished,

    /// Bytes received for the asset currently downloading
    DownloadProgress {
        asset: String,
        downloaded: u64,
        total: u64,
    },

    /// A line has been appended to the installation log
    LogAppended { entry: LogEntry },

    /// The current operation description has changed
    OperationChanged { operation: String },
}

/// Thread-safe state manager with event emission
///
/// The central state component of the installer:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// Always go through `StateManager` instead of touching [`AppState`]:
/// [`read()`](Self::read) for reads, [`update()`](Self::update) for
/// mutations with automatic event emission, [`subscribe()`](Self::subscribe)
/// to listen for changes.
pub struct StateManager {
    /// The application state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and a broadcast buffer
    /// of 100 events.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state.
    ///
    /// Clones the entire state so it is safe to use without holding locks.
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events.
    ///
    /// Captures the old state, applies the update function, diffs the two,
    /// and broadcasts an event for every difference found.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);
        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Diff two states and generate the events to broadcast.
    fn detect_changes(&self, old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.game_dir != new.game_dir
            || old.is_game_dir_configured != new.is_game_dir_configured
        {
            changes.push(StateChange::ConfigurationChanged {
                is_game_dir_configured: new.is_game_dir_configured,
            });
        }

        if old.active_task != new.active_task {
            match new.active_task {
                Some(task) => changes.push(StateChange::TaskStarted { task }),
                None => changes.push(StateChange::TaskFinished),
            }
        }

        if old.current_operation != new.current_operation {
            changes.push(StateChange::OperationChanged {
                operation: new.current_operation.clone(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Set the game directory and update the configuration flag.
    pub fn set_game_dir(&self, path: Option<Utf8PathBuf>) -> Vec<StateChange> {
        self.update(|state| {
            state.is_game_dir_configured = path.is_some();
            state.game_dir = path;
        })
    }

    /// Try to start a task. Returns false if another task is running.
    pub fn begin_task(&self, task: TaskKind) -> bool {
        let mut state = self.state.write().unwrap();
        if state.active_task.is_some() {
            tracing::warn!("Refusing to start {:?}: a task is already running", task);
            return false;
        }

        state.active_task = Some(task);
        state.current_operation = format!("Starting {}...", task.noun());
        state.reset_progress();

        let _ = self.state_tx.send(StateChange::TaskStarted { task });
        let _ = self.state_tx.send(StateChange::OperationChanged {
            operation: state.current_operation.clone(),
        });
        true
    }

    /// Mark the running task finished and clear progress.
    pub fn finish_task(&self) {
        {
            let mut state = self.state.write().unwrap();
            state.active_task = None;
            state.current_operation.clear();
            state.reset_progress();
        }
        let _ = self.state_tx.send(StateChange::TaskFinished);
    }

    /// Append a log line and broadcast it to subscribers.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            level,
            message: message.into(),
        };

        match level {
            LogLevel::Error => tracing::error!("{}", entry.message),
            LogLevel::Warning => tracing::warn!("{}", entry.message),
            _ => tracing::info!("{}", entry.message),
        }

        {
            let mut state = self.state.write().unwrap();
            state.append_log(entry.level, entry.message.clone());
        }
        let _ = self.state_tx.send(StateChange::LogAppended { entry });
    }

    /// Record download progress for an asset and broadcast it.
    pub fn update_download_progress(&self, asset: &str, downloaded: u64, total: u64) {
        {
            let mut state = self.state.write().unwrap();
            if state.current_asset.as_deref() != Some(asset) {
                state.current_asset = Some(asset.to_string());
            }
            state.bytes_downloaded = downloaded;
            state.bytes_total = total;
        }
        let _ = self.state_tx.send(StateChange::DownloadProgress {
            asset: asset.to_string(),
            downloaded,
            total,
        });
    }

    /// Set the current operation description.
    pub fn set_operation(&self, operation: impl Into<String>) -> Vec<StateChange> {
        self.update(|state| {
            state.current_operation = operation.into();
        })
    }

    /// Load settings from the installer configuration into state.
    pub fn load_from_config(&self, config: &crate::models::InstallerConfig) -> Vec<StateChange> {
        self.update(|state| {
            let settings = &config.settings;

            if !settings.game_dir.is_empty() {
                state.game_dir = Some(Utf8PathBuf::from(&settings.game_dir));
                state.is_game_dir_configured = true;
            }

            state.update_check = settings.update_check;
            state.debug_mode = settings.debug_mode;
            if !settings.last_installed_tag.is_empty() {
                state.last_installed_tag = Some(settings.last_installed_tag.clone());
            }

            tracing::info!(
                "Loaded settings: game_dir={}, update_check={}, debug={}",
                state.is_game_dir_configured,
                state.update_check,
                state.debug_mode
            );
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.is_busy());
        assert!(!state.is_game_dir_configured);
    }

    #[test]
    fn test_set_game_dir_emits_configuration_change() {
        let manager = StateManager::new();

        let changes = manager.set_game_dir(Some(Utf8PathBuf::from("/games/WorldBox")));

        assert_eq!(changes.len(), 1);
        assert!(matches!(
            changes[0],
            StateChange::ConfigurationChanged {
                is_game_dir_configured: true
            }
        ));
        assert!(manager.read(|s| s.is_game_dir_configured));
    }

    #[test]
    fn test_begin_task_blocks_second_task() {
        let manager = StateManager::new();

        assert!(manager.begin_task(TaskKind::Install));
        assert!(!manager.begin_task(TaskKind::Update));
        assert_eq!(manager.read(|s| s.active_task), Some(TaskKind::Install));
    }

    #[test]
    fn test_finish_task_clears_progress() {
        let manager = StateManager::new();
        manager.begin_task(TaskKind::Update);
        manager.update_download_progress("NeoModLoader.dll", 10, 100);

        manager.finish_task();

        let state = manager.snapshot();
        assert!(!state.is_busy());
        assert!(state.current_asset.is_none());
        assert_eq!(state.bytes_downloaded, 0);
    }

    #[test]
    fn test_log_appends_and_broadcasts() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.log(LogLevel::Success, "Valid WorldBox directory detected");

        let event = rx.try_recv().unwrap();
        match event {
            StateChange::LogAppended { entry } => {
                assert_eq!(entry.level, LogLevel::Success);
                assert_eq!(entry.message, "Valid WorldBox directory detected");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(manager.read(|s| s.log.len()), 1);
    }

    #[test]
    fn test_download_progress_broadcast() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.update_download_progress("NeoModLoader.pdb", 512, 2048);

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event,
            StateChange::DownloadProgress {
                asset: "NeoModLoader.pdb".to_string(),
                downloaded: 512,
                total: 2048,
            }
        );
        assert_eq!(manager.read(|s| s.bytes_total), 2048);
    }

    #[test]
    fn test_subscribe_to_task_lifecycle() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.begin_task(TaskKind::Install);
        manager.finish_task();

        assert!(matches!(
            rx.try_recv().unwrap(),
            StateChange::TaskStarted {
                task: TaskKind::Install
            }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            StateChange::OperationChanged { .. }
        ));
        assert!(matches!(rx.try_recv().unwrap(), StateChange::TaskFinished));
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.begin_task(TaskKind::Install);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_load_from_config() {
        let manager = StateManager::new();
        let mut config = crate::models::InstallerConfig::default();
        config.settings.game_dir = "/games/WorldBox".to_string();
        config.settings.debug_mode = true;
        config.settings.last_installed_tag = "v1.1.0".to_string();

        manager.load_from_config(&config);

        let state = manager.snapshot();
        assert_eq!(state.game_dir, Some(Utf8PathBuf::from("/games/WorldBox")));
        assert!(state.debug_mode);
        assert_eq!(state.last_installed_tag, Some("v1.1.0".to_string()));
    }

    #[test]
    fn test_clone_shares_state() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.set_game_dir(Some(Utf8PathBuf::from("/games/WorldBox")));

        assert!(manager2.read(|s| s.is_game_dir_configured));
    }
}
