//! Snapshot fan-out to observers.
//!
//! Each observer owns an unbounded queue, so no snapshot is ever merged or
//! dropped: an observer that drains late still sees every transition in
//! order. Closed queues are pruned on the next publish.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::view_state::ViewState;

pub(crate) type SnapshotTx = mpsc::UnboundedSender<Arc<ViewState>>;

/// Receiving end of [`AuthController::subscribe`](super::AuthController::subscribe).
///
/// Dropping the subscription detaches it.
#[derive(Debug)]
pub struct StateSubscription {
    rx: mpsc::UnboundedReceiver<Arc<ViewState>>,
}

impl StateSubscription {
    pub(crate) fn new(initial: Arc<ViewState>) -> (SnapshotTx, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        // Cannot fail: the receiver is alive.
        let _ = tx.send(initial);
        (tx, Self { rx })
    }

    /// Returns the next queued snapshot without waiting.
    pub fn try_next(&mut self) -> Option<Arc<ViewState>> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next snapshot. Returns `None` once the controller is
    /// disposed and the queue is empty.
    pub async fn next(&mut self) -> Option<Arc<ViewState>> {
        self.rx.recv().await
    }

    /// Takes every queued snapshot, oldest first.
    pub fn drain(&mut self) -> Vec<Arc<ViewState>> {
        let mut snapshots = Vec::new();
        while let Ok(snapshot) = self.rx.try_recv() {
            snapshots.push(snapshot);
        }
        snapshots
    }

    /// Stops receiving snapshots.
    pub fn detach(self) {}
}

/// Observer list owned by the controller.
#[derive(Debug, Default)]
pub(crate) struct Observers {
    senders: Vec<SnapshotTx>,
}

impl Observers {
    pub(crate) fn attach(&mut self, current: Arc<ViewState>) -> StateSubscription {
        let (tx, subscription) = StateSubscription::new(current);
        self.senders.push(tx);
        subscription
    }

    pub(crate) fn publish(&mut self, snapshot: &Arc<ViewState>) {
        self.senders.retain(|tx| tx.send(Arc::clone(snapshot)).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    pub(crate) fn clear(&mut self) {
        self.senders.clear();
    }
}
