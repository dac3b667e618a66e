//! Locating and validating the WorldBox installation directory.
//!
//! Detection probes a short list of well-known Steam library locations for a
//! `WorldBox` folder. Validation checks that a candidate directory contains
//! the two folders every WorldBox install ships with, and reports the names
//! of any that are missing.

use camino::{Utf8Path, Utf8PathBuf};

/// Name of the game folder inside a Steam library.
pub const GAME_FOLDER: &str = "WorldBox";

/// Subfolders a valid WorldBox directory must contain.
pub const REQUIRED_GAME_FOLDERS: [&str; 2] = ["worldbox_Data", "worldbox_Data/StreamingAssets"];

/// Steam library roots to probe during auto-detection.
///
/// On Windows the candidates come from the `ProgramFiles(x86)`,
/// `ProgramFiles` and `SystemDrive` environment variables; elsewhere the
/// usual Steam locations under the home directory are used. Unset variables
/// simply drop their candidate.
pub fn steam_library_candidates() -> Vec<Utf8PathBuf> {
    let mut roots = Vec::new();

    if cfg!(windows) {
        for var in ["ProgramFiles(x86)", "ProgramFiles"] {
            if let Ok(dir) = std::env::var(var) {
                roots.push(
                    Utf8PathBuf::from(dir)
                        .join("Steam")
                        .join("steamapps")
                        .join("common"),
                );
            }
        }

        let drive = std::env::var("SystemDrive").unwrap_or_else(|_| "C:".to_string());
        roots.push(
            Utf8PathBuf::from(drive)
                .join("SteamLibrary")
                .join("steamapps")
                .join("common"),
        );
    } else if let Ok(home) = std::env::var("HOME") {
        let home = Utf8PathBuf::from(home);
        roots.push(home.join(".local/share/Steam/steamapps/common"));
        roots.push(home.join(".steam/steam/steamapps/common"));
    }

    roots
}

/// Auto-detect the WorldBox directory in the standard Steam libraries.
pub fn find_game_dir() -> Option<Utf8PathBuf> {
    find_game_dir_in(&steam_library_candidates())
}

/// Probe each library root for a `WorldBox` folder; first hit wins.
pub fn find_game_dir_in(roots: &[Utf8PathBuf]) -> Option<Utf8PathBuf> {
    for root in roots {
        let candidate = root.join(GAME_FOLDER);
        if candidate.is_dir() {
            tracing::info!("Auto-detected WorldBox directory: {}", candidate);
            return Some(candidate);
        }
    }

    tracing::debug!("WorldBox not found in {} candidate locations", roots.len());
    None
}

/// Names of required subfolders absent from `dir`.
///
/// An empty result means the directory looks like a WorldBox install. All
/// missing names are reported, not just the first.
pub fn missing_game_folders(dir: &Utf8Path) -> Vec<String> {
    REQUIRED_GAME_FOLDERS
        .iter()
        .filter(|folder| !dir.join(folder).is_dir())
        .map(|folder| folder.to_string())
        .collect()
}

/// True when `dir` contains every required game folder.
pub fn is_game_dir(dir: &Utf8Path) -> bool {
    missing_game_folders(dir).is_empty()
}

/// Path of the mods folder under a game directory.
///
/// Loadable mods live in `worldbox_Data/StreamingAssets/mods`.
pub fn mods_dir(game_dir: &Utf8Path) -> Utf8PathBuf {
    game_dir
        .join("worldbox_Data")
        .join("StreamingAssets")
        .join("mods")
}
