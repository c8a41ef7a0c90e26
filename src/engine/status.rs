//! Engine status shared across threads
//!
//! The engine thread publishes its key-capture flags and the controller
//! discovery code publishes connection changes. The input thread takes
//! one snapshot per visibility recomputation, so a reading is never torn
//! between the two fields.

use std::sync::Arc;

use parking_lot::Mutex;

use super::sink::KeyCatch;

/// Point-in-time view of engine-owned state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStatus {
    pub key_catch: KeyCatch,
    pub controller_connected: bool,
}

impl EngineStatus {
    pub fn console_active(&self) -> bool {
        self.key_catch.console_active()
    }

    pub fn in_game(&self) -> bool {
        self.key_catch.in_game()
    }
}

/// Cloneable handle to the shared status
#[derive(Debug, Clone, Default)]
pub struct SharedEngineStatus {
    inner: Arc<Mutex<EngineStatus>>,
}

impl SharedEngineStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_key_catch(&self, key_catch: KeyCatch) {
        self.inner.lock().key_catch = key_catch;
    }

    pub fn set_controller_connected(&self, connected: bool) {
        let mut status = self.inner.lock();
        if status.controller_connected != connected {
            log::info!(
                "Game controller {}",
                if connected { "connected" } else { "disconnected" }
            );
        }
        status.controller_connected = connected;
    }

    /// Copy out the current status under a single lock
    pub fn snapshot(&self) -> EngineStatus {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_snapshot_defaults() {
        let status = SharedEngineStatus::new();
        let snap = status.snapshot();
        assert!(snap.in_game());
        assert!(!snap.console_active());
        assert!(!snap.controller_connected);
    }

    #[test]
    fn test_publish_from_other_thread() {
        let status = SharedEngineStatus::new();
        let writer = status.clone();

        thread::spawn(move || {
            writer.publish_key_catch(KeyCatch(KeyCatch::CONSOLE));
            writer.set_controller_connected(true);
        })
        .join()
        .unwrap();

        let snap = status.snapshot();
        assert!(snap.console_active());
        assert!(snap.controller_connected);
    }
}
