use camino::Utf8PathBuf;

/// Maximum number of log lines retained in [`AppState`].
///
/// The GUI log pane mirrors this buffer; once the limit is reached the
/// oldest lines are dropped so a long session cannot grow state without
/// bound.
pub const MAX_LOG_LINES: usize = 500;

/// Severity of a log pane line. Maps 1:1 to the colors used by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Stable string form, used as the level tag handed to the Slint layer.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

/// One line of the installation log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// The two long-running actions the installer can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    Install,
    Update,
}

impl TaskKind {
    /// Lowercase verb for log and error messages ("installation"/"update").
    pub fn noun(self) -> &'static str {
        match self {
            TaskKind::Install => "installation",
            TaskKind::Update => "update",
        }
    }
}

/// Single source of truth for all application state.
///
/// Holds the selected game directory, the in-flight task (if any), download
/// progress, and the installation log.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by
/// [`crate::state::StateManager`]. Never access it directly - go through
/// [`StateManager`](crate::state::StateManager) so mutations emit change
/// events for the GUI.
#[derive(Clone, Debug)]
pub struct AppState {
    // Directory selection
    pub game_dir: Option<Utf8PathBuf>,
    pub is_game_dir_configured: bool,

    // Runtime state
    pub active_task: Option<TaskKind>,
    pub current_operation: String,

    // Download progress for the asset currently transferring
    pub current_asset: Option<String>,
    pub bytes_downloaded: u64,
    pub bytes_total: u64,

    // Installation log
    pub log: Vec<LogEntry>,

    // Settings
    pub update_check: bool,
    pub debug_mode: bool,
    pub last_installed_tag: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            game_dir: None,
            is_game_dir_configured: false,

            active_task: None,
            current_operation: String::new(),

            current_asset: None,
            bytes_downloaded: 0,
            bytes_total: 0,

            log: Vec::new(),

            update_check: true,
            debug_mode: false,
            last_installed_tag: None,
        }
    }
}

impl AppState {
    /// True while an install or update task is running.
    pub fn is_busy(&self) -> bool {
        self.active_task.is_some()
    }

    /// Append a line to the installation log, dropping the oldest line once
    /// [`MAX_LOG_LINES`] is reached.
    pub fn append_log(&mut self, level: LogLevel, message: impl Into<String>) {
        if self.log.len() >= MAX_LOG_LINES {
            self.log.remove(0);
        }
        self.log.push(LogEntry {
            level,
            message: message.into(),
        });
    }

    /// Fraction of the current download completed, in `0.0..=1.0`.
    ///
    /// Returns 0.0 when the asset size is unknown (no content length).
    pub fn download_fraction(&self) -> f32 {
        if self.bytes_total == 0 {
            0.0
        } else {
            (self.bytes_downloaded as f64 / self.bytes_total as f64) as f32
        }
    }

    /// Clear per-task download progress.
    pub fn reset_progress(&mut self) {
        self.current_asset = None;
        self.bytes_downloaded = 0;
        self.bytes_total = 0;
    }
}
