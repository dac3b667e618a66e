//! Release metadata for the upstream NeoModLoader project.
//!
//! The installer asks the GitHub releases API for the latest release and
//! picks two assets out of its asset list: the loader library and its debug
//! symbol file. Assets are matched by filename suffix so upstream is free to
//! prefix release artifacts however it likes.

use serde::Deserialize;
use thiserror::Error;

/// Filename suffix of the loader library asset.
pub const LOADER_LIBRARY_SUFFIX: &str = "NeoModLoader.dll";

/// Filename suffix of the loader debug symbols asset.
pub const LOADER_SYMBOLS_SUFFIX: &str = "NeoModLoader.pdb";

/// A published upstream release, decoded from the releases API payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ModRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: String,
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

/// The two assets an installation needs.
#[derive(Debug, Clone)]
pub struct LoaderAssets {
    pub library: ReleaseAsset,
    pub symbols: ReleaseAsset,
}

impl LoaderAssets {
    /// The assets in download order: library first, then symbols.
    pub fn in_order(&self) -> [&ReleaseAsset; 2] {
        [&self.library, &self.symbols]
    }
}

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("release {tag} has no asset ending in: {missing}")]
    AssetsMissing { tag: String, missing: String },
}

impl ModRelease {
    /// Version string for display, with any leading `v` stripped from the tag.
    pub fn version(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }

    /// Resolve the loader library and symbols assets from the asset list.
    ///
    /// A linear scan matches each expected filename suffix; the order of the
    /// assets in the payload does not matter. If either asset is absent the
    /// error names every missing suffix.
    pub fn resolve_loader_assets(&self) -> Result<LoaderAssets, ReleaseError> {
        let library = self.asset_with_suffix(LOADER_LIBRARY_SUFFIX);
        let symbols = self.asset_with_suffix(LOADER_SYMBOLS_SUFFIX);

        match (library, symbols) {
            (Some(library), Some(symbols)) => Ok(LoaderAssets {
                library: library.clone(),
                symbols: symbols.clone(),
            }),
            (library, symbols) => {
                let mut missing = Vec::new();
                if library.is_none() {
                    missing.push(LOADER_LIBRARY_SUFFIX);
                }
                if symbols.is_none() {
                    missing.push(LOADER_SYMBOLS_SUFFIX);
                }
                Err(ReleaseError::AssetsMissing {
                    tag: self.tag_name.clone(),
                    missing: missing.join(", "),
                })
            }
        }
    }

    fn asset_with_suffix(&self, suffix: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name.ends_with(suffix))
    }
}
