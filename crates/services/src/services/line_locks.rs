use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::topology::LineId;

/// One async mutex per line. Topology changes to the same line run one at a
/// time; different lines never wait on each other.
#[derive(Clone, Default)]
pub struct LineLocks {
    locks: Arc<Mutex<HashMap<LineId, Arc<Mutex<()>>>>>,
}

impl LineLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, line_id: LineId) -> OwnedMutexGuard<()> {
        let line_lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(line_id).or_default().clone()
        };
        line_lock.lock_owned().await
    }

    /// Drops the bookkeeping for a deleted line. Holders of the old mutex
    /// keep it until they release it.
    pub async fn forget(&self, line_id: LineId) {
        self.locks.lock().await.remove(&line_id);
    }
}
