use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use futures_util::StreamExt;
use reqwest::Client;
use std::fs;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::services::game_detection::mods_dir;
use crate::services::release::{LoaderAssets, ModRelease, ReleaseAsset};

/// Releases-metadata endpoint of the upstream NeoModLoader project.
pub const RELEASES_ENDPOINT: &str =
    "https://api.github.com/repos/WorldBoxOpenMods/ModLoader/releases/latest";

/// Legacy NCMS loader file that conflicts with NeoModLoader.
pub const LEGACY_LOADER_FILE: &str = "NCMS_memload.dll";

const USER_AGENT: &str = concat!("nml-installer/", env!("CARGO_PKG_VERSION"));

/// Errors from the network side of an install
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("release request failed with status {0}")]
    ReleaseRequest(reqwest::StatusCode),

    #[error("download of {name} failed with status {status}")]
    DownloadRequest {
        name: String,
        status: reqwest::StatusCode,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Service for fetching releases and placing loader files on disk
///
/// Owns the HTTP client and the releases endpoint (injectable for tests).
/// The filesystem helpers take explicit paths and no hidden state, so the
/// install and update workflows stay a thin sequence of calls.
pub struct InstallerService {
    client: Client,
    releases_url: String,
}

impl InstallerService {
    /// Create a service pointing at the upstream releases endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(RELEASES_ENDPOINT)
    }

    /// Create a service against a custom releases endpoint.
    pub fn with_endpoint(releases_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            releases_url: releases_url.into(),
        }
    }

    /// Fetch the latest upstream release.
    ///
    /// One GET to the releases endpoint; any non-success status is an error.
    pub async fn fetch_latest_release(&self) -> Result<ModRelease, InstallError> {
        tracing::debug!("Fetching release metadata from {}", self.releases_url);

        let response = self.client.get(&self.releases_url).send().await?;
        if !response.status().is_success() {
            return Err(InstallError::ReleaseRequest(response.status()));
        }

        let release: ModRelease = response.json().await?;
        tracing::info!(
            "Latest release {} with {} assets",
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }

    /// Download an asset into `dest_dir`, streamed chunk by chunk.
    ///
    /// The file is written as `<dest_dir>/<asset name>`, replacing any
    /// previous copy. `progress` is invoked after every chunk with the bytes
    /// received so far and the expected total (0 when unknown).
    pub async fn download_asset<F>(
        &self,
        asset: &ReleaseAsset,
        dest_dir: &Utf8Path,
        mut progress: F,
    ) -> Result<Utf8PathBuf, InstallError>
    where
        F: FnMut(u64, u64),
    {
        let dest = dest_dir.join(&asset.name);
        tracing::info!("Downloading {} to {}", asset.name, dest);

        let response = self.client.get(&asset.browser_download_url).send().await?;
        if !response.status().is_success() {
            return Err(InstallError::DownloadRequest {
                name: asset.name.clone(),
                status: response.status(),
            });
        }

        // The asset list usually carries the size; fall back to the
        // response's content length when it doesn't.
        let total = if asset.size > 0 {
            asset.size
        } else {
            response.content_length().unwrap_or(0)
        };

        let mut file = tokio::fs::File::create(dest.as_std_path()).await?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            progress(downloaded, total);
        }

        file.flush().await?;
        tracing::info!("Downloaded {} ({} bytes)", asset.name, downloaded);
        Ok(dest)
    }

    /// Create the mods folder under `game_dir` if needed and return its path.
    pub fn ensure_mods_dir(&self, game_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        let mods = mods_dir(game_dir);
        fs::create_dir_all(&mods)
            .with_context(|| format!("Failed to create mods folder: {mods}"))?;
        Ok(mods)
    }

    /// True when the legacy NCMS loader is present in the mods folder.
    pub fn legacy_loader_present(&self, mods: &Utf8Path) -> bool {
        mods.join(LEGACY_LOADER_FILE).exists()
    }

    /// Delete the legacy NCMS loader if present.
    ///
    /// Returns whether a file was actually removed.
    pub fn remove_legacy_loader(&self, mods: &Utf8Path) -> Result<bool> {
        let legacy = mods.join(LEGACY_LOADER_FILE);
        if !legacy.exists() {
            return Ok(false);
        }

        fs::remove_file(&legacy)
            .with_context(|| format!("Failed to remove legacy loader: {legacy}"))?;
        tracing::info!("Removed legacy loader {}", legacy);
        Ok(true)
    }

    /// True when an update must fall back to a full install because the
    /// mods folder does not exist yet.
    pub fn update_requires_full_install(&self, game_dir: &Utf8Path) -> bool {
        !mods_dir(game_dir).is_dir()
    }

    /// True when both loader files from a previous installation are on disk.
    pub fn existing_install_present(&self, mods: &Utf8Path, assets: &LoaderAssets) -> bool {
        mods.join(&assets.library.name).exists() && mods.join(&assets.symbols.name).exists()
    }
}

impl Default for InstallerService {
    fn default() -> Self {
        Self::new()
    }
}
