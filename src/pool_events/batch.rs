// Batch Accumulator
//
// Records decoded during one run. `flush` consumes the batch, so a batch can
// reach the store at most once.

use super::store::PoolEventStore;
use crate::types::PoolEvent;
use tracing::debug;

#[derive(Debug, Default)]
pub struct PoolEventBatch {
    events: Vec<PoolEvent>,
}

impl PoolEventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Records in the order they were decoded.
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Write every record in a single store call, together with `checkpoint`.
    ///
    /// Empty batches still advance the checkpoint. Returns the number of
    /// records written.
    ///
    /// The batch is consumed even when the save fails: the records are dropped
    /// and the checkpoint stays where it was, so the caller must abort and let
    /// the source re-deliver the range.
    pub async fn flush(self, store: &dyn PoolEventStore, checkpoint: u64) -> eyre::Result<usize> {
        let count = self.events.len();
        store.save(&self.events, checkpoint).await?;
        debug!("Flushed {} pool events (checkpoint {})", count, checkpoint);
        Ok(count)
    }
}
