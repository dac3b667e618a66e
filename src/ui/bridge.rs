// EventLoopBridge - Coordinates between the tokio runtime and the Slint event loop
//
// The installer runs two event loops: Slint's single-threaded GUI loop and
// tokio's worker pool for downloads. The bridge marshals between them:
// UI updates requested from tokio tasks are queued onto the Slint loop, and
// Slint callbacks can hand async work to tokio.

use slint::{ComponentHandle, Weak};
use std::future::Future;
use tokio::sync::mpsc;

/// Coordinates between the tokio async runtime and the Slint event loop
///
/// - `update_ui()` safely applies a closure to the UI from any thread
/// - `spawn_async()` hands a future to tokio from a Slint callback
pub struct EventLoopBridge<T: ComponentHandle> {
    /// Weak reference to the UI component to avoid a reference cycle
    ui_weak: Weak<T>,

    /// Handle to the tokio runtime for spawning async tasks
    tokio_handle: tokio::runtime::Handle,

    /// Queue of pending UI updates, bounded so a lagging UI cannot grow it
    /// without limit
    ui_update_tx: mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create a bridge for `ui`, starting the handler thread that drains the
    /// update queue into the Slint event loop.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle) -> Self {
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<Box<dyn FnOnce(&T) + Send>>(100);

        let ui_weak_clone = ui_weak.clone();
        std::thread::spawn(move || {
            tracing::debug!("EventLoopBridge handler thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                // upgrade_in_event_loop queues the closure onto Slint's
                // event loop thread with an upgraded component handle
                let result = ui_weak_clone.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    // The event loop has stopped; no more updates can land
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    break;
                }
            }

            tracing::debug!("EventLoopBridge handler thread terminated");
        });

        Self {
            ui_weak,
            tokio_handle,
            ui_update_tx,
        }
    }

    /// Schedule a UI update from any thread.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        send_update(&self.ui_update_tx, update);
    }

    /// Spawn an async task on the tokio runtime from a Slint callback.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    /// Get a cloneable handle for capturing in multiple Slint callbacks.
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        EventLoopBridgeHandle {
            ui_weak: self.ui_weak.clone(),
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

/// Lightweight cloneable handle to the bridge
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    ui_weak: Weak<T>,
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            ui_weak: self.ui_weak.clone(),
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Schedule a UI update from any thread.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        send_update(&self.ui_update_tx, update);
    }

    /// Spawn an async task on the tokio runtime.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    /// Weak reference to the UI component.
    pub fn ui_weak(&self) -> &Weak<T> {
        &self.ui_weak
    }
}

fn send_update<T: ComponentHandle>(
    tx: &mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
    update: impl FnOnce(&T) + Send + 'static,
) {
    match tx.try_send(Box::new(update)) {
        Ok(_) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!("UI update channel full - dropping update");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::warn!("Failed to send UI update - handler thread has stopped");
        }
    }
}
