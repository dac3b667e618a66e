//! NML Installer - GUI installer and updater for NeoModLoader
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend for the NeoModLoader
//! installer. It initializes:
//! - Configuration loading ([`ConfigManager`] - remembers the game directory)
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime (worker threads for release fetches and downloads)
//! - State management ([`StateManager`])
//! - GUI controller ([`GuiController`] - bridges Slint UI with business logic)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Handle async operations (HTTP, streamed downloads)
//! - **State listener**: Background std::thread for reactive UI updates
//!
//! # Execution Flow
//!
//! 1. Load settings from NML Data/NML Installer.yaml (defaults when absent)
//! 2. Initialize logging → logs/nml-installer.<date>
//! 3. Create tokio runtime with 2 worker threads
//! 4. Create StateManager (Arc<RwLock<AppState>>) and seed it from settings
//! 5. Create GuiController (wires Slint UI to state and runtime)
//! 6. Run Slint event loop (blocks until window closed)
//! 7. Log session metrics and shut the tokio runtime down with a 5s timeout
//!
//! # Platform
//!
//! Primary platform: Windows 10/11 (x86_64), where WorldBox ships via Steam.
//! Secondary: Linux via Slint and the Steam paths under the home directory.

use anyhow::Result;
use nml_installer::ui::GuiController;
use nml_installer::{ConfigManager, Metrics, StateManager, APP_NAME, VERSION};
use std::sync::Arc;

/// Main entry point for the NML installer GUI
///
/// # Errors
///
/// This function can fail if:
/// - Logging initialization fails (disk space, permissions)
/// - Tokio runtime creation fails (system resources)
/// - Slint UI initialization fails (graphics drivers, display)
/// - The GUI encounters a fatal error during execution
fn main() -> Result<()> {
    // Load settings before logging so the debug-mode flag can raise the
    // log level; anything traced during this load is lost, which is fine.
    let config_manager = Arc::new(ConfigManager::new("NML Data")?);
    let settings = config_manager.load_settings().unwrap_or_default();

    let _log_guard = nml_installer::logging::setup_logging(
        "logs",
        "nml-installer",
        settings.settings.debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Create tokio runtime for async operations (release fetch + downloads)
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("nml-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 2);

    // Create state manager and seed it from the persisted settings
    let state_manager = Arc::new(StateManager::new());
    state_manager.load_from_config(&settings);
    tracing::info!("State manager initialized");

    // Session metrics, summarized at shutdown
    let metrics = Arc::new(Metrics::new());

    // Create GUI controller
    // This wires up the Slint UI with state management and the tokio runtime
    let gui_controller = GuiController::new(
        Arc::clone(&state_manager),
        Arc::clone(&config_manager),
        Arc::clone(&metrics),
        runtime.handle().clone(),
    )?;

    tracing::info!("GUI controller initialized, launching window");

    // Run the GUI (blocks until window is closed)
    // The tokio runtime stays alive in the background to handle async tasks
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");

    if state_manager.read(|s| s.is_busy()) {
        tracing::warn!("Window closed while a task was still running");
    }

    metrics.log_summary();

    // Shutdown the tokio runtime gracefully
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
