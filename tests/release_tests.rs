//! Integration tests for release asset resolution
//!
//! These tests verify:
//! - Decoding of the GitHub releases/latest payload
//! - Resolution of the loader library and symbols assets by filename suffix
//! - Order independence of the asset scan
//! - Error reporting naming every missing asset

use nml_installer::services::release::{
    ModRelease, LOADER_LIBRARY_SUFFIX, LOADER_SYMBOLS_SUFFIX,
};

fn payload_with_assets(asset_names: &[&str]) -> String {
    let assets: Vec<String> = asset_names
        .iter()
        .map(|name| {
            format!(
                r#"{{"name": "{name}", "browser_download_url": "https://example.com/dl/{name}", "size": 4096}}"#
            )
        })
        .collect();

    format!(
        r#"{{"tag_name": "v1.2.0", "name": "NeoModLoader 1.2.0", "assets": [{}]}}"#,
        assets.join(",")
    )
}

#[test]
fn test_resolves_both_assets_in_payload_order() {
    let payload = payload_with_assets(&["NeoModLoader.dll", "NeoModLoader.pdb"]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let assets = release.resolve_loader_assets().unwrap();
    assert_eq!(assets.library.name, "NeoModLoader.dll");
    assert_eq!(assets.symbols.name, "NeoModLoader.pdb");
}

#[test]
fn test_resolves_both_assets_in_reversed_order() {
    let payload = payload_with_assets(&["NeoModLoader.pdb", "NeoModLoader.dll"]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let assets = release.resolve_loader_assets().unwrap();
    assert_eq!(assets.library.name, "NeoModLoader.dll");
    assert_eq!(assets.symbols.name, "NeoModLoader.pdb");
}

#[test]
fn test_resolves_among_unrelated_assets() {
    let payload = payload_with_assets(&[
        "checksums.txt",
        "NeoModLoader.pdb",
        "Source code (zip)",
        "NeoModLoader.dll",
        "NeoModLoader.xml",
    ]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let assets = release.resolve_loader_assets().unwrap();
    assert!(assets.library.browser_download_url.ends_with("NeoModLoader.dll"));
    assert!(assets.symbols.browser_download_url.ends_with("NeoModLoader.pdb"));
}

#[test]
fn test_suffix_match_accepts_prefixed_names() {
    let payload = payload_with_assets(&["v1.2.0-NeoModLoader.dll", "v1.2.0-NeoModLoader.pdb"]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let assets = release.resolve_loader_assets().unwrap();
    assert_eq!(assets.library.name, "v1.2.0-NeoModLoader.dll");
}

#[test]
fn test_missing_library_is_named_in_error() {
    let payload = payload_with_assets(&["NeoModLoader.pdb"]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let err = release.resolve_loader_assets().unwrap_err().to_string();
    assert!(err.contains(LOADER_LIBRARY_SUFFIX));
    assert!(err.contains("v1.2.0"));
}

#[test]
fn test_missing_symbols_is_named_in_error() {
    let payload = payload_with_assets(&["NeoModLoader.dll"]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let err = release.resolve_loader_assets().unwrap_err().to_string();
    assert!(err.contains(LOADER_SYMBOLS_SUFFIX));
}

#[test]
fn test_empty_asset_list_names_both() {
    let payload = payload_with_assets(&[]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let err = release.resolve_loader_assets().unwrap_err().to_string();
    assert!(err.contains(LOADER_LIBRARY_SUFFIX));
    assert!(err.contains(LOADER_SYMBOLS_SUFFIX));
}

#[test]
fn test_download_order_is_library_then_symbols() {
    let payload = payload_with_assets(&["NeoModLoader.pdb", "NeoModLoader.dll"]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();

    let assets = release.resolve_loader_assets().unwrap();
    let ordered = assets.in_order();
    assert_eq!(ordered[0].name, "NeoModLoader.dll");
    assert_eq!(ordered[1].name, "NeoModLoader.pdb");
}

#[test]
fn test_version_display() {
    let payload = payload_with_assets(&[]);
    let release: ModRelease = serde_json::from_str(&payload).unwrap();
    assert_eq!(release.version(), "1.2.0");
}

#[test]
fn test_real_payload_shape_with_extra_fields() {
    // Trimmed-down copy of a real releases/latest response; unknown fields
    // must be ignored.
    let payload = r#"{
        "url": "https://api.github.com/repos/WorldBoxOpenMods/ModLoader/releases/12345",
        "tag_name": "v1.2.0",
        "name": "NeoModLoader 1.2.0",
        "draft": false,
        "prerelease": false,
        "assets": [
            {
                "url": "https://api.github.com/repos/WorldBoxOpenMods/ModLoader/releases/assets/1",
                "name": "NeoModLoader.dll",
                "content_type": "application/x-msdownload",
                "size": 212992,
                "download_count": 4211,
                "browser_download_url": "https://github.com/WorldBoxOpenMods/ModLoader/releases/download/v1.2.0/NeoModLoader.dll"
            },
            {
                "url": "https://api.github.com/repos/WorldBoxOpenMods/ModLoader/releases/assets/2",
                "name": "NeoModLoader.pdb",
                "content_type": "application/octet-stream",
                "size": 48128,
                "download_count": 4100,
                "browser_download_url": "https://github.com/WorldBoxOpenMods/ModLoader/releases/download/v1.2.0/NeoModLoader.pdb"
            }
        ],
        "body": "Changelog..."
    }"#;

    let release: ModRelease = serde_json::from_str(payload).unwrap();
    let assets = release.resolve_loader_assets().unwrap();
    assert_eq!(assets.library.size, 212992);
    assert_eq!(assets.symbols.size, 48128);
}
