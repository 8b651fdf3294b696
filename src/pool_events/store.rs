// Pool Event Store
//
// Persistence seam: bulk upsert keyed by event id plus a processor checkpoint.

use crate::types::PoolEvent;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[async_trait]
pub trait PoolEventStore: Send + Sync {
    /// Upsert `events` by id and record `checkpoint` as the last processed
    /// height. Either everything becomes visible or nothing does.
    async fn save(&self, events: &[PoolEvent], checkpoint: u64) -> eyre::Result<()>;

    /// Look up a single record by id.
    async fn fetch(&self, id: &str) -> eyre::Result<Option<PoolEvent>>;

    /// Last height recorded by `save`, if any.
    async fn checkpoint(&self) -> eyre::Result<Option<u64>>;
}

#[derive(Debug, Default)]
struct MemoryState {
    events: BTreeMap<String, PoolEvent>,
    checkpoint: Option<u64>,
    writes: usize,
}

/// In-process store (dry runs, tests).
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct records held.
    pub async fn len(&self) -> usize {
        self.state.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of `save` calls that reached the store.
    pub async fn writes(&self) -> usize {
        self.state.lock().await.writes
    }

    /// All records ordered by id.
    pub async fn snapshot(&self) -> Vec<PoolEvent> {
        self.state.lock().await.events.values().cloned().collect()
    }
}

#[async_trait]
impl PoolEventStore for MemoryStore {
    async fn save(&self, events: &[PoolEvent], checkpoint: u64) -> eyre::Result<()> {
        let mut state = self.state.lock().await;
        for event in events {
            state.events.insert(event.id.clone(), event.clone());
        }
        state.checkpoint = Some(checkpoint);
        state.writes += 1;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> eyre::Result<Option<PoolEvent>> {
        Ok(self.state.lock().await.events.get(id).cloned())
    }

    async fn checkpoint(&self) -> eyre::Result<Option<u64>> {
        Ok(self.state.lock().await.checkpoint)
    }
}
