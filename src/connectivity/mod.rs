//! Live connectivity monitoring.
//!
//! The platform's network layer owns a [`tokio::sync::watch`] sender and
//! publishes the active network's capability set (or `None` when there is no
//! active network) into it. The monitor reduces that to the binary question
//! the app cares about: is there a network that can actually reach the
//! internet over Wi-Fi, cellular or Ethernet.
//!
//! Callbacks are edge-triggered. Capability churn that stays on one side of
//! the online/offline boundary (e.g. a hand-over from Wi-Fi to cellular)
//! fires nothing.

#[cfg(test)]
mod tests;

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// A transport the active network runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    /// Anything else (Bluetooth, USB, ...); never qualifies on its own.
    Other,
}

/// Capability set of the active network, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkCapabilities {
    pub transports: Vec<Transport>,
    /// Whether the network declares general internet capability.
    pub internet: bool,
}

impl NetworkCapabilities {
    /// Online means internet capability over at least one qualifying
    /// transport.
    fn qualifies(&self) -> bool {
        self.internet
            && self.transports.iter().any(|t| {
                matches!(t, Transport::Wifi | Transport::Cellular | Transport::Ethernet)
            })
    }
}

struct EdgeCallbacks {
    on_available: Box<dyn Fn() + Send>,
    on_lost: Box<dyn Fn() + Send>,
}

struct EdgeEmitter {
    slot: Mutex<Option<EdgeCallbacks>>,
}

impl EdgeEmitter {
    fn lock(&self) -> MutexGuard<'_, Option<EdgeCallbacks>> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn available(&self) {
        if let Some(callbacks) = &*self.lock() {
            (callbacks.on_available)();
        }
    }

    fn lost(&self) {
        if let Some(callbacks) = &*self.lock() {
            (callbacks.on_lost)();
        }
    }

    fn close(&self) {
        *self.lock() = None;
    }
}

/// Handle to a started monitor. Dropping it stops the callbacks.
pub struct MonitorHandle {
    emitter: Arc<EdgeEmitter>,
    abort: AbortHandle,
}

impl MonitorHandle {
    /// Stops the monitor. Idempotent; once this returns, neither callback
    /// fires again.
    pub fn stop(&self) {
        self.emitter.close();
        self.abort.abort();
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Watches the platform's network state and raises online/offline edges.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    rx: watch::Receiver<Option<NetworkCapabilities>>,
}

impl ConnectivityMonitor {
    pub fn new(rx: watch::Receiver<Option<NetworkCapabilities>>) -> Self {
        Self { rx }
    }

    /// Synchronous point-in-time check of the active network.
    pub fn is_online(&self) -> bool {
        self.rx
            .borrow()
            .as_ref()
            .is_some_and(NetworkCapabilities::qualifies)
    }

    /// Starts edge-triggered monitoring. `on_available` fires on each
    /// offline→online transition, `on_lost` on each online→offline one; the
    /// current state at start fires nothing. Must be called within a Tokio
    /// runtime.
    pub fn start(
        &self,
        on_available: impl Fn() + Send + 'static,
        on_lost: impl Fn() + Send + 'static,
    ) -> MonitorHandle {
        let emitter = Arc::new(EdgeEmitter {
            slot: Mutex::new(Some(EdgeCallbacks {
                on_available: Box::new(on_available),
                on_lost: Box::new(on_lost),
            })),
        });

        let mut rx = self.rx.clone();
        let task_emitter = Arc::clone(&emitter);
        let task = tokio::spawn(async move {
            let mut online = rx
                .borrow_and_update()
                .as_ref()
                .is_some_and(NetworkCapabilities::qualifies);

            while rx.changed().await.is_ok() {
                let now_online = rx
                    .borrow_and_update()
                    .as_ref()
                    .is_some_and(NetworkCapabilities::qualifies);
                if now_online == online {
                    continue;
                }
                online = now_online;
                debug!("connectivity edge: online={online}");
                if online {
                    task_emitter.available();
                } else {
                    task_emitter.lost();
                }
            }
        });

        MonitorHandle {
            emitter,
            abort: task.abort_handle(),
        }
    }
}
