//! Stop signal shared by every long-running task.

use tokio::sync::broadcast;

/// Cloneable stop handle.
///
/// The probe loops, the TCP accept loop and the axum server each hold a
/// receiver from [`Shutdown::subscribe`]. Dropping every handle closes the
/// channel, which those tasks treat the same as a trigger.
#[derive(Debug, Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Tell every subscriber to stop. Safe to call with nobody listening.
    pub fn trigger(&self) {
        if self.notify.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no running tasks");
        }
    }

    /// Tasks still holding a receiver.
    pub fn subscribers(&self) -> usize {
        self.notify.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
