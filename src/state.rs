use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// whether the server is up, and the address to show the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerState {
    pub is_running: bool,
    /// Already formatted as `http://<ip>:8080`; `None` when the LAN address
    /// could not be resolved (the server may still be running).
    pub address: Option<String>,
}

// snapshot of the one in-flight upload, published to whoever is watching.
// received_bytes never decreases within a session and never exceeds total_bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub file_name: Option<String>,
    pub received_bytes: u64,
    pub total_bytes: Option<u64>,
    pub is_completed: bool,
    pub error_message: Option<String>,
}

// a fully received upload, handed to the library layer exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub file_name: String,
    pub content: String,
}

/// How long a terminal progress frame (completed or failed) stays visible
/// before the slot is cleared, so the host UI can show a final frame.
pub const PROGRESS_CLEAR_DELAY: Duration = Duration::from_secs(2);

/// Single shared progress slot. All sessions write here, last writer wins;
/// the host copies frames out rather than reading in place.
pub struct ProgressSlot {
    tx: watch::Sender<Option<UploadProgress>>,
    epoch: AtomicU64,
}

impl ProgressSlot {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UploadProgress>> {
        self.tx.subscribe()
    }

    /// current frame, copied out
    pub fn current(&self) -> Option<UploadProgress> {
        self.tx.borrow().clone()
    }

    // publish an in-flight frame; bumping the epoch kills any pending clear
    pub(crate) fn publish(&self, progress: UploadProgress) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(Some(progress));
    }

    /// Publish a terminal frame and clear it after the grace period, unless
    /// something newer has been published in the meantime.
    pub(crate) fn publish_transient(self: &Arc<Self>, progress: UploadProgress) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(Some(progress));

        let slot = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(PROGRESS_CLEAR_DELAY).await;
            if slot.epoch.load(Ordering::SeqCst) == epoch {
                slot.tx.send_replace(None);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn terminal_frame_clears_after_grace_period() {
        let slot = Arc::new(ProgressSlot::new());
        slot.publish_transient(UploadProgress {
            is_completed: true,
            ..Default::default()
        });
        assert!(slot.current().is_some());

        tokio::time::sleep(PROGRESS_CLEAR_DELAY + Duration::from_millis(200)).await;
        assert!(slot.current().is_none());
    }

    #[tokio::test]
    async fn newer_publication_cancels_stale_clear() {
        let slot = Arc::new(ProgressSlot::new());
        slot.publish_transient(UploadProgress {
            error_message: Some("connection lost".into()),
            ..Default::default()
        });

        // a fresh session starts publishing before the clear fires
        let fresh = UploadProgress {
            file_name: Some("next.txt".into()),
            received_bytes: 10,
            total_bytes: Some(100),
            ..Default::default()
        };
        slot.publish(fresh.clone());

        tokio::time::sleep(PROGRESS_CLEAR_DELAY + Duration::from_millis(200)).await;
        assert_eq!(slot.current(), Some(fresh));
    }
}
