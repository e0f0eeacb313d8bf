//! Continuous position subscription feeding the navigator

use std::sync::Arc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use rn_core::{NavEvent, Position, PositionOptions, PositionSource, WatchHandle};

struct Subscription {
    watch: WatchHandle,
    forward: JoinHandle<()>,
}

/// Subscribes to a [`PositionSource`] and forwards readings as navigator events
///
/// Errors are forwarded as [`NavEvent::PositionFailed`] and never clear the
/// last known-good position.
pub struct PositionStream {
    source: Arc<dyn PositionSource>,
    options: PositionOptions,
    last_known: Arc<RwLock<Option<Position>>>,
    subscription: Mutex<Option<Subscription>>,
}

impl PositionStream {
    /// Create a stopped stream
    pub fn new(source: Arc<dyn PositionSource>, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            last_known: Arc::new(RwLock::new(None)),
            subscription: Mutex::new(None),
        }
    }

    /// Subscribe and deliver every reading to `forward`; no-op when already running
    pub fn start<F>(&self, forward: F)
    where
        F: Fn(NavEvent) + Send + 'static,
    {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            tracing::debug!("Position stream already running");
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let watch = self.source.watch(self.options, tx);
        let last_known = self.last_known.clone();

        let task = tokio::spawn(async move {
            while let Some(reading) = rx.recv().await {
                match reading {
                    Ok(position) => {
                        *last_known.write() = Some(position.clone());
                        forward(NavEvent::PositionUpdated(position));
                    }
                    Err(error) => {
                        tracing::warn!("Position source error: {}", error);
                        forward(NavEvent::PositionFailed(error));
                    }
                }
            }
            tracing::debug!("Position source closed");
        });

        tracing::info!("Position stream started");
        *subscription = Some(Subscription { watch, forward: task });
    }

    /// Unsubscribe; safe to call when not running
    pub fn stop(&self) {
        if let Some(mut subscription) = self.subscription.lock().take() {
            subscription.watch.cancel();
            subscription.forward.abort();
            tracing::info!("Position stream stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Latest known-good position
    pub fn last_known(&self) -> Option<Position> {
        self.last_known.read().clone()
    }
}

impl Drop for PositionStream {
    fn drop(&mut self) {
        self.stop();
    }
}
