//! Data models for the NeoModLoader installer.
//!
//! This module contains the core data structures used throughout the
//! application:
//! - [`AppState`]: The central state container holding the selected game
//!   directory, the in-flight task, download progress, and the log
//! - [`InstallerConfig`]: User preferences loaded from `NML Installer.yaml`
//! - [`LogEntry`] / [`LogLevel`]: Lines of the installation log pane
//! - [`TaskKind`]: Which long-running action (install or update) is active
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: The config structs derive `Serialize`/`Deserialize`
//!   for YAML persistence
//! - **Cloneable**: `AppState` is wrapped in `Arc<RwLock<>>` by
//!   [`StateManager`](crate::state::StateManager) for thread-safe access
//! - **Passive**: State updates go through StateManager's `update()` method
//!   so the GUI sees every change as an event

pub mod app_state;
pub mod config;

pub use app_state::{AppState, LogEntry, LogLevel, TaskKind, MAX_LOG_LINES};
pub use config::{InstallerConfig, NmlSettings};
