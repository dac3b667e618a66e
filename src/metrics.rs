// Performance metrics module
//
// Lightweight counters for what the installer actually did in a session

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Session metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Counters
/// are recorded by the install and update workflows and summarized through
/// tracing at shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Release metadata fetches performed
    pub releases_fetched: AtomicUsize,

    /// Assets downloaded successfully
    pub downloads_completed: AtomicUsize,

    /// Assets whose download failed
    pub downloads_failed: AtomicUsize,

    /// Total bytes written by downloads
    pub bytes_downloaded: AtomicU64,

    /// Full installations completed
    pub installs_completed: AtomicUsize,

    /// Updates completed
    pub updates_completed: AtomicUsize,

    /// Legacy loader files removed
    pub legacy_loaders_removed: AtomicUsize,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            releases_fetched: AtomicUsize::new(0),
            downloads_completed: AtomicUsize::new(0),
            downloads_failed: AtomicUsize::new(0),
            bytes_downloaded: AtomicU64::new(0),
            installs_completed: AtomicUsize::new(0),
            updates_completed: AtomicUsize::new(0),
            legacy_loaders_removed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a release metadata fetch
    pub fn record_release_fetched(&self) {
        self.releases_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed asset download of `bytes` bytes
    pub fn record_download_completed(&self, bytes: u64) {
        self.downloads_completed.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a failed asset download
    pub fn record_download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed installation
    pub fn record_install_completed(&self) {
        self.installs_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed update
    pub fn record_update_completed(&self) {
        self.updates_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record removal of a legacy loader file
    pub fn record_legacy_loader_removed(&self) {
        self.legacy_loaders_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Releases fetched: {}, downloads: {} ok / {} failed ({} bytes)",
            self.releases_fetched.load(Ordering::Relaxed),
            self.downloads_completed.load(Ordering::Relaxed),
            self.downloads_failed.load(Ordering::Relaxed),
            self.bytes_downloaded.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Installs: {}, updates: {}, legacy loaders removed: {}",
            self.installs_completed.load(Ordering::Relaxed),
            self.updates_completed.load(Ordering::Relaxed),
            self.legacy_loaders_removed.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.downloads_completed.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.installs_completed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_downloads() {
        let metrics = Metrics::new();

        metrics.record_download_completed(1024);
        metrics.record_download_completed(2048);
        metrics.record_download_failed();

        assert_eq!(metrics.downloads_completed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.downloads_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.bytes_downloaded.load(Ordering::Relaxed), 3072);
    }

    #[test]
    fn test_record_task_completions() {
        let metrics = Metrics::new();

        metrics.record_release_fetched();
        metrics.record_install_completed();
        metrics.record_update_completed();
        metrics.record_legacy_loader_removed();

        assert_eq!(metrics.releases_fetched.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.installs_completed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.updates_completed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.legacy_loaders_removed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
