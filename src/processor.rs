// Block Processor
//
// Walks each delivered batch block by block, decodes the pair's logs into a
// fresh PoolEventBatch and flushes it once at the end of the batch. Resumes
// from the store checkpoint.

use crate::error::DecodeError;
use crate::pool_events::{EventMapper, PoolEventBatch, PoolEventStore};
use crate::source::{Block, BlockSource};
use crate::types::EventType;
use alloy_primitives::Address;
use eyre::WrapErr;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Outcome of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub first_block: u64,
    pub last_block: u64,
    pub blocks: usize,
    pub events: usize,
}

/// Totals across a whole `Processor::run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub batches: u64,
    pub blocks: u64,
    pub events: u64,
    pub last_block: Option<u64>,
}

/// Decode every tracked log of `contract` in `blocks`, in delivery order.
///
/// Only logs whose first topic is a Mint/Burn/Swap/Transfer signature are
/// handed to the mapper. Stops at the first fatal decode error; nothing is
/// returned for the batch in that case.
pub fn process_blocks(
    blocks: &[Block],
    contract: Address,
    mapper: &EventMapper,
) -> Result<PoolEventBatch, DecodeError> {
    let mut batch = PoolEventBatch::new();

    for block in blocks {
        let before = batch.len();

        for entry in &block.events {
            let Some(log) = entry.evm_log() else {
                continue;
            };
            if log.address != contract {
                trace!("Skipping log {} from {}", entry.id, log.address);
                continue;
            }
            // Approval/Sync and other untracked events never reach the mapper
            let tracked = log.topics().first().and_then(EventType::from_topic);
            if tracked.is_none() {
                trace!("Skipping untracked log {} ({:?})", entry.id, log.topics().first());
                continue;
            }

            if let Some(event) = mapper.decode(&block.header, entry, log)? {
                batch.push(event);
            }
        }

        let decoded = batch.len() - before;
        if decoded > 0 {
            debug!("Block {}: decoded {} pool events", block.header.height, decoded);
        }
    }

    Ok(batch)
}

pub struct Processor<S> {
    source: S,
    store: Arc<dyn PoolEventStore>,
    contract: Address,
    mapper: EventMapper,
    start_block: u64,
}

impl<S: BlockSource> Processor<S> {
    pub fn new(
        source: S,
        store: Arc<dyn PoolEventStore>,
        contract: Address,
        mapper: EventMapper,
        start_block: u64,
    ) -> Self {
        Self {
            source,
            store,
            contract,
            mapper,
            start_block,
        }
    }

    /// Process and flush one batch. Returns `None` for an empty batch.
    pub async fn run_batch(&self, blocks: &[Block]) -> eyre::Result<Option<BatchSummary>> {
        let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
            return Ok(None);
        };
        let first_block = first.header.height;
        let last_block = last.header.height;

        info!(
            "Processing {} blocks [{} - {}]",
            blocks.len(),
            first_block,
            last_block
        );

        let batch = process_blocks(blocks, self.contract, &self.mapper)?;

        info!("Saving blocks from {} to {}", first_block, last_block);
        let count = batch.len();
        let events = batch
            .flush(self.store.as_ref(), last_block)
            .await
            .wrap_err_with(|| {
                format!(
                    "flushing {} pool events for blocks {}..={}",
                    count, first_block, last_block
                )
            })?;

        Ok(Some(BatchSummary {
            first_block,
            last_block,
            blocks: blocks.len(),
            events,
        }))
    }

    /// First height to request: one past the checkpoint, never below the
    /// configured start block.
    pub async fn resume_height(&self) -> eyre::Result<u64> {
        let resume = match self.store.checkpoint().await? {
            Some(height) => self.start_block.max(height.saturating_add(1)),
            None => self.start_block,
        };
        Ok(resume)
    }

    /// Drain the source batch by batch.
    pub async fn run(&mut self) -> eyre::Result<ProcessorStats> {
        let mut stats = ProcessorStats::default();
        let mut next_height = self.resume_height().await?;
        info!("Starting from block {}", next_height);

        while let Some(blocks) = self.source.next_batch(next_height).await? {
            let Some(summary) = self.run_batch(&blocks).await? else {
                continue;
            };

            next_height = summary.last_block.saturating_add(1);
            stats.batches += 1;
            stats.blocks += summary.blocks as u64;
            stats.events += summary.events as u64;
            stats.last_block = Some(summary.last_block);

            info!(
                "Stats: {} blocks processed, {} total pool events saved",
                stats.blocks, stats.events
            );
        }

        Ok(stats)
    }
}
