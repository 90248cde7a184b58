use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::assembler::ResultSet;

/// What a consumer sees when it reads the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    NotYetRun,
    Unavailable,
    Available(Arc<ResultSet>),
}

/// Ticket handed to an invocation when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Externally visible result cell. Only the most recently started invocation
/// may commit; older ones find out they were superseded and drop their result.
#[derive(Debug)]
pub struct BalanceSlot {
    latest: AtomicU64,
    state: RwLock<SlotState>,
}

impl Default for BalanceSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceSlot {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            state: RwLock::new(SlotState::NotYetRun),
        }
    }

    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Publishes `state` if `generation` is still the newest. Returns whether it did.
    pub async fn commit(&self, generation: Generation, state: SlotState) -> bool {
        let mut slot = self.state.write().await;
        // checked under the write lock so a stale commit can't land after a newer one
        if !self.is_current(generation) {
            debug!("discarding result of superseded invocation {}", generation.0);
            return false;
        }
        *slot = state;
        true
    }

    pub async fn read(&self) -> SlotState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_not_yet_run() {
        assert_eq!(BalanceSlot::new().read().await, SlotState::NotYetRun);
    }

    #[tokio::test]
    async fn generations_increase() {
        let slot = BalanceSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(second > first);
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
    }

    #[tokio::test]
    async fn stale_commit_is_discarded() {
        let slot = BalanceSlot::new();
        let old = slot.begin();
        let new = slot.begin();

        assert!(slot.commit(new, SlotState::Unavailable).await);
        assert!(!slot.commit(old, SlotState::Available(Arc::default())).await);
        assert_eq!(slot.read().await, SlotState::Unavailable);
    }

    #[tokio::test]
    async fn stale_commit_before_newer_one_finishes_is_still_discarded() {
        let slot = BalanceSlot::new();
        let old = slot.begin();
        let _new = slot.begin();

        assert!(!slot.commit(old, SlotState::Unavailable).await);
        assert_eq!(slot.read().await, SlotState::NotYetRun);
    }
}
