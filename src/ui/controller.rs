// GUI Controller - Bridges the Slint UI with Rust state management
//
// Coordinates between:
// - Slint UI (MainWindow)
// - StateManager (application state)
// - InstallerService (release fetch + downloads)
// - EventLoopBridge (async/GUI coordination)
//
// It wires UI callbacks to async install/update workflows, subscribes to
// state changes for reactive UI updates, and owns the folder picker and
// dialog plumbing.

use crate::config::ConfigManager;
use crate::metrics::Metrics;
use crate::models::{AppState, LogEntry, LogLevel, TaskKind, MAX_LOG_LINES};
use crate::services::game_detection::{find_game_dir, is_game_dir, missing_game_folders, mods_dir};
use crate::services::installer::{InstallerService, LEGACY_LOADER_FILE};
use crate::services::release::{LoaderAssets, ModRelease, ReleaseAsset};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use slint::{Model, ModelRc, VecModel};
use std::sync::Arc;

// Include the generated Slint code
slint::include_modules!();

/// GUI Controller that wires the Slint UI to application state and logic
///
/// The main coordinator for the GUI layer:
/// - Creates and manages the EventLoopBridge for tokio/Slint coordination
/// - Connects Slint callbacks to the install and update workflows
/// - Subscribes to StateManager events and renders them (log lines, progress)
/// - Handles the native folder picker via the `rfd` crate
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Event loop bridge for coordinating between tokio and Slint
    _bridge: EventLoopBridge<MainWindow>,

    /// Shared state manager
    _state_manager: Arc<StateManager>,

    /// Configuration manager for persisting settings
    _config_manager: Arc<ConfigManager>,
}

impl GuiController {
    /// Create a new GUI controller
    ///
    /// # Arguments
    /// * `state_manager` - Shared application state manager
    /// * `config_manager` - Configuration manager for persisting settings
    /// * `metrics` - Session metrics recorded by the workflows
    /// * `tokio_handle` - Handle to the tokio runtime for spawning async tasks
    pub fn new(
        state_manager: Arc<StateManager>,
        config_manager: Arc<ConfigManager>,
        metrics: Arc<Metrics>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        let bridge = EventLoopBridge::new(&ui, tokio_handle);

        // Initialize UI with current state
        Self::sync_ui_with_state(&ui, &state_manager);

        // Set up Slint callbacks
        Self::setup_callbacks(&ui, &bridge, &state_manager, &config_manager, &metrics);

        // Subscribe to state changes and update UI
        Self::setup_state_subscription(&bridge, &state_manager);

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            _state_manager: state_manager,
            _config_manager: config_manager,
        })
    }

    /// Run the GUI (blocks until window is closed)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    /// Synchronize UI with current state
    ///
    /// Called once at startup to initialize the UI.
    fn sync_ui_with_state(ui: &MainWindow, state_manager: &StateManager) {
        let state = state_manager.snapshot();

        ui.set_game_dir_path(
            state
                .game_dir
                .as_ref()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default()
                .into(),
        );
        ui.set_game_dir_valid(
            state
                .game_dir
                .as_ref()
                .map(|p| is_game_dir(p))
                .unwrap_or(false),
        );

        ui.set_is_busy(state.is_busy());
        ui.set_current_operation(state.current_operation.clone().into());
        ui.set_download_active(false);
        ui.set_download_progress(0.0);

        let lines: Vec<LogLine> = state.log.iter().map(Self::to_slint_log_line).collect();
        ui.set_log_lines(ModelRc::new(VecModel::from(lines)));

        ui.set_status_message(Self::get_status_message(&state).into());

        tracing::debug!("UI synchronized with initial state");
    }

    /// Set up Slint UI callbacks
    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
        config_manager: &Arc<ConfigManager>,
        metrics: &Arc<Metrics>,
    ) {
        let state = Arc::clone(state_manager);
        let config = Arc::clone(config_manager);

        // Browse for the game directory with the native folder picker
        ui.on_browse_directory(move || {
            tracing::debug!("Browse directory clicked");

            if let Some(dir) = Self::show_folder_picker("Select WorldBox Directory") {
                tracing::info!("Game directory selected: {}", dir);
                Self::apply_game_dir(&state, &config, dir);
            }
        });

        let state = Arc::clone(state_manager);
        let config = Arc::clone(config_manager);

        // Auto-detect the game directory in the standard Steam libraries
        ui.on_auto_detect(move || {
            tracing::debug!("Auto-detect clicked");

            match find_game_dir() {
                Some(dir) => {
                    state.log(
                        LogLevel::Success,
                        format!("Auto-detected WorldBox directory: {dir}"),
                    );
                    Self::apply_game_dir(&state, &config, dir);
                }
                None => {
                    state.log(LogLevel::Warning, "Could not auto-detect WorldBox directory.");
                }
            }
        });

        let state = Arc::clone(state_manager);

        // Manual edits to the directory field
        ui.on_game_dir_edited(move |text| {
            let text = text.trim();
            if text.is_empty() {
                state.set_game_dir(None);
            } else {
                state.set_game_dir(Some(Utf8PathBuf::from(text)));
            }
        });

        let bridge_handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let config = Arc::clone(config_manager);
        let metrics_clone = Arc::clone(metrics);
        let ui_weak = ui.as_weak();

        ui.on_install_clicked(move || {
            tracing::info!("Install button clicked");
            Self::request_task(
                &ui_weak,
                &bridge_handle,
                &state,
                &config,
                &metrics_clone,
                TaskKind::Install,
                false,
            );
        });

        let bridge_handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let config = Arc::clone(config_manager);
        let metrics_clone = Arc::clone(metrics);
        let ui_weak = ui.as_weak();

        ui.on_update_clicked(move || {
            tracing::info!("Update button clicked");
            Self::request_task(
                &ui_weak,
                &bridge_handle,
                &state,
                &config,
                &metrics_clone,
                TaskKind::Update,
                false,
            );
        });

        let bridge_handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let config = Arc::clone(config_manager);
        let metrics_clone = Arc::clone(metrics);
        let ui_weak = ui.as_weak();

        // User confirmed running against a directory missing game folders
        ui.on_missing_folders_proceed(move || {
            tracing::info!("User confirmed proceeding with unvalidated directory");

            let Some(ui) = ui_weak.upgrade() else { return };
            ui.set_show_missing_folders_dialog(false);

            let task = match ui.get_pending_task() {
                1 => Some(TaskKind::Install),
                2 => Some(TaskKind::Update),
                _ => None,
            };
            ui.set_pending_task(0);

            if let Some(task) = task {
                Self::request_task(
                    &ui_weak,
                    &bridge_handle,
                    &state,
                    &config,
                    &metrics_clone,
                    task,
                    true,
                );
            }
        });

        let ui_weak = ui.as_weak();

        ui.on_missing_folders_cancelled(move || {
            tracing::info!("User cancelled after missing-folders warning");

            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_missing_folders_dialog(false);
                ui.set_pending_task(0);
            }
        });

        let ui_weak = ui.as_weak();

        ui.on_error_dialog_dismissed(move || {
            tracing::debug!("Error dialog dismissed");

            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_error_dialog(false);
            }
        });

        let ui_weak = ui.as_weak();

        ui.on_exit_clicked(move || {
            tracing::info!("Exit button clicked");

            if let Some(ui) = ui_weak.upgrade() {
                ui.window().hide().ok();
            }
        });

        tracing::debug!("UI callbacks configured");
    }

    /// Subscribe to state changes and update the UI accordingly
    ///
    /// Spawns a background thread that listens for state change events and
    /// marshals the matching UI updates through the EventLoopBridge.
    fn setup_state_subscription(
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
    ) {
        let bridge_handle = bridge.clone_handle();
        let state_manager_clone = Arc::clone(state_manager);
        let mut rx = state_manager.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);

                        match change {
                            StateChange::ConfigurationChanged { .. } => {
                                let snapshot = state_manager_clone.snapshot();
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_game_dir_path(
                                        snapshot
                                            .game_dir
                                            .as_ref()
                                            .map(|p| p.as_str().to_string())
                                            .unwrap_or_default()
                                            .into(),
                                    );
                                    ui.set_game_dir_valid(
                                        snapshot
                                            .game_dir
                                            .as_ref()
                                            .map(|p| is_game_dir(p))
                                            .unwrap_or(false),
                                    );
                                    ui.set_status_message(
                                        Self::get_status_message(&snapshot).into(),
                                    );
                                });
                            }

                            StateChange::TaskStarted { task } => {
                                tracing::info!("Task started: {:?}", task);
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_is_busy(true);
                                    ui.set_download_active(false);
                                    ui.set_download_progress(0.0);
                                    ui.set_status_message(
                                        match task {
                                            TaskKind::Install => "Installation in progress...",
                                            TaskKind::Update => "Update in progress...",
                                        }
                                        .into(),
                                    );
                                });
                            }

                            StateChange::TaskFinished => {
                                tracing::info!("Task finished");
                                let snapshot = state_manager_clone.snapshot();
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_is_busy(false);
                                    ui.set_download_active(false);
                                    ui.set_current_operation("".into());
                                    ui.set_status_message(
                                        Self::get_status_message(&snapshot).into(),
                                    );
                                });
                            }

                            StateChange::DownloadProgress {
                                asset,
                                downloaded,
                                total,
                            } => {
                                let fraction = if total > 0 {
                                    (downloaded as f64 / total as f64) as f32
                                } else {
                                    0.0
                                };
                                let operation = if total > 0 {
                                    format!(
                                        "Downloading {} ({:.0}%)",
                                        asset,
                                        fraction * 100.0
                                    )
                                } else {
                                    format!("Downloading {} ({} bytes)", asset, downloaded)
                                };

                                bridge_handle.update_ui(move |ui| {
                                    ui.set_download_active(true);
                                    ui.set_download_progress(fraction);
                                    ui.set_current_operation(operation.into());
                                });
                            }

                            StateChange::LogAppended { entry } => {
                                bridge_handle.update_ui(move |ui| {
                                    Self::append_log_line(ui, &entry);
                                });
                            }

                            StateChange::OperationChanged { operation } => {
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_current_operation(operation.into());
                                });
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped",
                            skipped
                        );
                        // Recoverable - keep receiving
                    }
                }
            }

            tracing::debug!("State subscription thread terminated gracefully");
        });
    }

    // ===== Task Orchestration =====

    /// Validate preconditions and start an install or update task
    ///
    /// Pre-flight failures (no directory, directory missing) surface as an
    /// error dialog. A directory that exists but fails folder validation asks
    /// for confirmation once; the confirmed retry arrives with `force = true`.
    fn request_task(
        ui_weak: &slint::Weak<MainWindow>,
        bridge: &EventLoopBridgeHandle<MainWindow>,
        state: &Arc<StateManager>,
        config: &Arc<ConfigManager>,
        metrics: &Arc<Metrics>,
        task: TaskKind,
        force: bool,
    ) {
        let game_dir = state.read(|s| s.game_dir.clone());
        let Some(game_dir) = game_dir.filter(|d| !d.as_str().trim().is_empty()) else {
            Self::show_error_dialog(ui_weak, "Error", "Please select a WorldBox directory");
            return;
        };

        if !game_dir.exists() {
            Self::show_error_dialog(ui_weak, "Error", "The specified directory does not exist");
            return;
        }

        let missing = missing_game_folders(&game_dir);
        if !missing.is_empty() && !force {
            state.log(
                LogLevel::Warning,
                format!("Warning: Missing required folders: {}", missing.join(", ")),
            );

            if let Some(ui) = ui_weak.upgrade() {
                ui.set_missing_folders_text(
                    "The selected directory appears to be missing required WorldBox folders.\n\
                     Are you sure this is the correct directory?"
                        .into(),
                );
                ui.set_pending_task(match task {
                    TaskKind::Install => 1,
                    TaskKind::Update => 2,
                });
                ui.set_show_missing_folders_dialog(true);
            }
            return;
        } else if missing.is_empty() {
            state.log(LogLevel::Success, "Valid WorldBox directory detected");
        }

        if !state.begin_task(task) {
            return;
        }

        let state = Arc::clone(state);
        let config = Arc::clone(config);
        let metrics = Arc::clone(metrics);

        bridge.spawn_async(move || async move {
            let service = InstallerService::new();

            let outcome = match task {
                TaskKind::Install => {
                    Self::run_install(&state, &metrics, &service, &game_dir).await
                }
                TaskKind::Update => Self::run_update(&state, &metrics, &service, &game_dir).await,
            };

            match outcome {
                Ok(tag) => {
                    state.update(|s| s.last_installed_tag = Some(tag.clone()));
                    Self::persist_settings(&config, &game_dir, Some(&tag));
                }
                Err(e) => {
                    tracing::error!("{} workflow failed: {:?}", task.noun(), e);
                    state.log(
                        LogLevel::Error,
                        format!("Error during {}: {e:#}", task.noun()),
                    );
                }
            }

            state.finish_task();
        });
    }

    /// Run a full installation. Returns the installed release tag.
    async fn run_install(
        state: &StateManager,
        metrics: &Metrics,
        service: &InstallerService,
        game_dir: &Utf8Path,
    ) -> Result<String> {
        let mods = service.ensure_mods_dir(game_dir)?;

        if service.legacy_loader_present(&mods) {
            state.log(
                LogLevel::Warning,
                format!("{LEGACY_LOADER_FILE} found - it will be removed during installation"),
            );
        } else {
            state.log(LogLevel::Success, "No NCMS installation detected");
        }

        let (release, assets) = Self::fetch_loader_assets(state, metrics, service).await?;

        for asset in assets.in_order() {
            Self::download_to_mods(state, metrics, service, asset, &mods).await?;
        }

        if service.remove_legacy_loader(&mods)? {
            metrics.record_legacy_loader_removed();
            state.log(LogLevel::Success, format!("Removed {LEGACY_LOADER_FILE}"));
        }

        metrics.record_install_completed();
        state.log(LogLevel::Success, "Installation complete!");
        state.log(
            LogLevel::Info,
            "Tip: Subscribe to NML on Steam Workshop for automatic updates.",
        );

        Ok(release.tag_name)
    }

    /// Run an update. Falls back to a full install when the mods folder does
    /// not exist yet. Returns the installed release tag.
    async fn run_update(
        state: &StateManager,
        metrics: &Metrics,
        service: &InstallerService,
        game_dir: &Utf8Path,
    ) -> Result<String> {
        if service.update_requires_full_install(game_dir) {
            state.log(
                LogLevel::Warning,
                "Mods directory not found - performing fresh install",
            );
            return Self::run_install(state, metrics, service, game_dir).await;
        }

        let mods = mods_dir(game_dir);
        let (release, assets) = Self::fetch_loader_assets(state, metrics, service).await?;

        if service.existing_install_present(&mods, &assets) {
            state.log(
                LogLevel::Info,
                "Found existing NeoModLoader installation - updating...",
            );
        } else {
            state.log(LogLevel::Info, "Performing fresh installation...");
        }

        for asset in assets.in_order() {
            Self::download_to_mods(state, metrics, service, asset, &mods).await?;
        }

        metrics.record_update_completed();
        state.log(LogLevel::Success, "Update complete!");

        Ok(release.tag_name)
    }

    /// Fetch the latest release and resolve the two loader assets.
    async fn fetch_loader_assets(
        state: &StateManager,
        metrics: &Metrics,
        service: &InstallerService,
    ) -> Result<(ModRelease, LoaderAssets)> {
        state.set_operation("Fetching latest release...");
        state.log(LogLevel::Info, "Fetching latest NeoModLoader release...");

        let release = service
            .fetch_latest_release()
            .await
            .context("Failed to fetch release metadata")?;
        metrics.record_release_fetched();

        state.log(
            LogLevel::Info,
            format!("Latest release: {}", release.tag_name),
        );

        let assets = release.resolve_loader_assets()?;
        Ok((release, assets))
    }

    /// Download one asset into the mods folder, reporting progress to state.
    async fn download_to_mods(
        state: &StateManager,
        metrics: &Metrics,
        service: &InstallerService,
        asset: &ReleaseAsset,
        mods: &Utf8Path,
    ) -> Result<()> {
        state.log(
            LogLevel::Info,
            format!("Downloading {} to {}", asset.name, mods.join(&asset.name)),
        );

        let progress_state = state.clone();
        let name = asset.name.clone();

        let result = service
            .download_asset(asset, mods, move |downloaded, total| {
                progress_state.update_download_progress(&name, downloaded, total);
            })
            .await;

        match result {
            Ok(path) => {
                let bytes = std::fs::metadata(path.as_std_path())
                    .map(|m| m.len())
                    .unwrap_or(0);
                metrics.record_download_completed(bytes);
                state.log(
                    LogLevel::Success,
                    format!("Successfully downloaded {}", asset.name),
                );
                Ok(())
            }
            Err(e) => {
                metrics.record_download_failed();
                Err(anyhow::Error::from(e)
                    .context(format!("Error downloading {}", asset.name)))
            }
        }
    }

    // ===== Helpers =====

    /// Set the game directory in state, log the validation result, and
    /// persist the selection.
    fn apply_game_dir(state: &StateManager, config: &ConfigManager, dir: Utf8PathBuf) {
        state.set_game_dir(Some(dir.clone()));

        let missing = missing_game_folders(&dir);
        if missing.is_empty() {
            state.log(LogLevel::Success, "Valid WorldBox directory detected");
        } else {
            state.log(
                LogLevel::Warning,
                format!("Warning: Missing required folders: {}", missing.join(", ")),
            );
        }

        Self::persist_settings(config, &dir, None);
    }

    /// Write the current selection (and optionally the installed tag) into
    /// the settings file. Persistence failures are logged, never fatal.
    fn persist_settings(config: &ConfigManager, game_dir: &Utf8Path, tag: Option<&str>) {
        let mut cfg = config.load_settings().unwrap_or_default();
        cfg.settings.game_dir = game_dir.to_string();
        if let Some(tag) = tag {
            cfg.settings.last_installed_tag = tag.to_string();
        }

        if let Err(e) = config.save_settings(&cfg) {
            tracing::warn!("Failed to persist settings: {:#}", e);
        }
    }

    /// Contextual status line for the bottom of the window.
    fn get_status_message(state: &AppState) -> String {
        match state.active_task {
            Some(TaskKind::Install) => "Installation in progress...".to_string(),
            Some(TaskKind::Update) => "Update in progress...".to_string(),
            None => {
                if state.game_dir.is_none() {
                    "Select your WorldBox directory to begin".to_string()
                } else {
                    "Ready".to_string()
                }
            }
        }
    }

    /// Append one entry to the UI log model, pruning the oldest line once
    /// the pane mirrors the state buffer's limit.
    fn append_log_line(ui: &MainWindow, entry: &LogEntry) {
        let model = ui.get_log_lines();
        if let Some(lines) = model.as_any().downcast_ref::<VecModel<LogLine>>() {
            if lines.row_count() >= MAX_LOG_LINES {
                lines.remove(0);
            }
            lines.push(Self::to_slint_log_line(entry));
        }
    }

    fn to_slint_log_line(entry: &LogEntry) -> LogLine {
        LogLine {
            text: entry.message.clone().into(),
            level: entry.level.as_str().into(),
        }
    }

    /// Show an error dialog with the given title and message.
    fn show_error_dialog(
        ui_weak: &slint::Weak<MainWindow>,
        title: impl Into<slint::SharedString>,
        message: impl Into<slint::SharedString>,
    ) {
        if let Some(ui) = ui_weak.upgrade() {
            ui.set_error_title(title.into());
            ui.set_error_message(message.into());
            ui.set_show_error_dialog(true);
        }
    }

    /// Show the native folder picker and return the chosen directory.
    fn show_folder_picker(title: &str) -> Option<Utf8PathBuf> {
        use rfd::FileDialog;

        FileDialog::new().set_title(title).pick_folder().and_then(|path| {
            Utf8PathBuf::try_from(path)
                .map_err(|e| {
                    tracing::error!("Failed to convert path to UTF-8: {}", e);
                    e
                })
                .ok()
        })
    }
}
