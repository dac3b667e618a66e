//! Integration tests for game directory detection and validation
//!
//! These tests verify:
//! - Auto-detection of the WorldBox folder across candidate Steam libraries
//! - Validation of a chosen directory against the required subfolders
//! - Reporting of every missing folder name
//! - The mods folder path convention

use camino::Utf8PathBuf;
use nml_installer::services::game_detection::{
    find_game_dir_in, is_game_dir, missing_game_folders, mods_dir, steam_library_candidates,
    GAME_FOLDER, REQUIRED_GAME_FOLDERS,
};
use std::fs;
use tempfile::TempDir;

fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
}

/// Build a complete fake WorldBox install under `root` and return its path.
fn make_game_dir(root: &Utf8PathBuf) -> Utf8PathBuf {
    let game = root.join(GAME_FOLDER);
    fs::create_dir_all(game.join("worldbox_Data").join("StreamingAssets")).unwrap();
    game
}

#[test]
fn test_detect_in_first_matching_library() {
    let temp = TempDir::new().unwrap();
    let library_a = utf8(&temp).join("library_a");
    let library_b = utf8(&temp).join("library_b");
    fs::create_dir_all(&library_a).unwrap();
    let game = make_game_dir(&library_b);

    let found = find_game_dir_in(&[library_a, library_b]);
    assert_eq!(found, Some(game));
}

#[test]
fn test_detect_prefers_earlier_library() {
    let temp = TempDir::new().unwrap();
    let library_a = utf8(&temp).join("library_a");
    let library_b = utf8(&temp).join("library_b");
    let game_a = make_game_dir(&library_a);
    make_game_dir(&library_b);

    let found = find_game_dir_in(&[library_a, library_b]);
    assert_eq!(found, Some(game_a));
}

#[test]
fn test_detect_ignores_plain_file_named_worldbox() {
    let temp = TempDir::new().unwrap();
    let library = utf8(&temp);
    fs::write(library.join(GAME_FOLDER), b"not a directory").unwrap();

    assert_eq!(find_game_dir_in(&[library]), None);
}

#[test]
fn test_detect_nothing_in_missing_roots() {
    assert_eq!(
        find_game_dir_in(&[Utf8PathBuf::from("/no/such/steam/library")]),
        None
    );
}

#[test]
fn test_valid_directory_passes_validation() {
    let temp = TempDir::new().unwrap();
    let game = make_game_dir(&utf8(&temp));

    assert!(is_game_dir(&game));
    assert!(missing_game_folders(&game).is_empty());
}

#[test]
fn test_all_missing_folders_are_reported() {
    let temp = TempDir::new().unwrap();
    let game = utf8(&temp);

    let missing = missing_game_folders(&game);
    assert_eq!(missing.len(), REQUIRED_GAME_FOLDERS.len());
    for folder in REQUIRED_GAME_FOLDERS {
        assert!(missing.contains(&folder.to_string()));
    }
}

#[test]
fn test_partial_install_reports_only_missing_folder() {
    let temp = TempDir::new().unwrap();
    let game = utf8(&temp);
    fs::create_dir_all(game.join("worldbox_Data")).unwrap();

    let missing = missing_game_folders(&game);
    assert_eq!(missing, vec!["worldbox_Data/StreamingAssets".to_string()]);
    assert!(!is_game_dir(&game));
}

#[test]
fn test_mods_dir_under_streaming_assets() {
    let temp = TempDir::new().unwrap();
    let game = make_game_dir(&utf8(&temp));

    let mods = mods_dir(&game);
    assert_eq!(
        mods,
        game.join("worldbox_Data").join("StreamingAssets").join("mods")
    );
}

#[test]
fn test_candidate_list_is_bounded() {
    // The candidate list is a short hardcoded set derived from environment
    // variables; it never explodes or comes back empty on a normal system.
    let candidates = steam_library_candidates();
    assert!(candidates.len() <= 4);
    for root in &candidates {
        assert!(root.as_str().contains("steamapps") || root.as_str().contains("Steam"));
    }
}
