//! Services module - business logic for locating the game and installing the loader.
//!
//! Everything here is **framework-agnostic**: no Slint, no GUI code, only
//! filesystem probing and HTTP. The controller layer orchestrates these
//! services and owns all presentation.
//!
//! # Components
//!
//! - [`game_detection`]: Auto-detection of the WorldBox directory across the
//!   standard Steam library locations, validation of a chosen directory, and
//!   the mods-folder path convention.
//!
//! - [`release`]: The upstream release descriptor decoded from the GitHub
//!   releases API, and resolution of the two loader assets by filename
//!   suffix.
//!
//! - [`InstallerService`]: The release fetch, streamed asset downloads with
//!   per-chunk progress, mods-folder creation, and legacy loader removal.
//!
//! # Design Philosophy
//!
//! - **Explicit inputs**: all paths and endpoints are parameters; the
//!   releases endpoint is injectable for tests
//! - **Async where it blocks**: network transfers run on tokio; the cheap
//!   filesystem probes stay synchronous
//! - **Testable**: the filesystem side needs nothing but a temp directory

pub mod game_detection;
pub mod installer;
pub mod release;

pub use game_detection::{find_game_dir, is_game_dir, missing_game_folders, mods_dir};
pub use installer::{InstallError, InstallerService, LEGACY_LOADER_FILE, RELEASES_ENDPOINT};
pub use release::{
    LoaderAssets, ModRelease, ReleaseAsset, ReleaseError, LOADER_LIBRARY_SUFFIX,
    LOADER_SYMBOLS_SUFFIX,
};
