//! Scoped ownership of a mounted screen's live resources.
//!
//! A screen owns at most one label registration, one tutorial registration
//! and one monitor handle. The session guarantees they are released on every
//! exit path: explicit [`ScreenSession::release`], replacement by a newer
//! handle, or plain drop. The optional release hook carries side effects the
//! shell ties to unmounting; the main screen wires `sign_out` into it, since
//! the shipped app signs the user out whenever that screen stops.

use crate::connectivity::MonitorHandle;
use crate::content::ListenerRegistration;
use log::debug;

#[derive(Default)]
pub struct ScreenSession {
    labels: Option<ListenerRegistration>,
    tutorial: Option<ListenerRegistration>,
    monitor: Option<MonitorHandle>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl ScreenSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts the label registration, releasing any previous one.
    pub fn set_labels(&mut self, registration: ListenerRegistration) {
        if let Some(old) = self.labels.replace(registration) {
            old.remove();
        }
    }

    /// Adopts the tutorial registration, releasing any previous one. This is
    /// also the path the `Resubscribe` effect takes.
    pub fn set_tutorial(&mut self, registration: ListenerRegistration) {
        if let Some(old) = self.tutorial.replace(registration) {
            old.remove();
        }
    }

    /// Adopts the monitor handle, stopping any previous one.
    pub fn set_monitor(&mut self, handle: MonitorHandle) {
        if let Some(old) = self.monitor.replace(handle) {
            old.stop();
        }
    }

    /// Registers a hook that runs once when the session is released.
    pub fn on_release(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.on_release = Some(Box::new(hook));
    }

    /// Releases everything. Idempotent; later calls find nothing to do.
    pub fn release(&mut self) {
        if let Some(registration) = self.labels.take() {
            registration.remove();
        }
        if let Some(registration) = self.tutorial.take() {
            registration.remove();
        }
        if let Some(handle) = self.monitor.take() {
            handle.stop();
        }
        if let Some(hook) = self.on_release.take() {
            debug!("running screen release hook");
            hook();
        }
    }
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn release_runs_the_hook_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut session = ScreenSession::new();
        {
            let calls = Arc::clone(&calls);
            session.on_release(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        session.release();
        session.release();
        drop(session);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_alone_runs_the_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let mut session = ScreenSession::new();
            let calls = Arc::clone(&calls);
            session.on_release(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
