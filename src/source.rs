// Block Source
//
// Finalized blocks with their event entries, as delivered by an archive or a
// replay log. The processor only consumes the `BlockSource` trait.

use crate::error::SourceError;
use alloy_primitives::Log;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

/// Pallet event name carrying EVM logs.
pub const EVM_LOG_EVENT: &str = "EVM.Log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u64,

    /// Block timestamp (milliseconds since epoch on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,

    #[serde(default)]
    pub events: Vec<EventEntry>,
}

/// Extrinsic enclosing an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrinsicRef {
    pub index_in_block: u32,

    /// Hex public key of the signer; absent for unsigned extrinsics (inherents)
    #[serde(default)]
    pub signer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Globally unique event id assigned by the archive
    pub id: String,

    /// Pallet event name, e.g. "EVM.Log"
    pub name: String,

    /// Position of the event within the block
    pub index_in_block: u32,

    #[serde(default)]
    pub extrinsic: Option<ExtrinsicRef>,

    /// Raw log for EVM.Log events
    #[serde(default)]
    pub log: Option<Log>,
}

impl EventEntry {
    /// The raw EVM log, if this entry is an `EVM.Log` event.
    pub fn evm_log(&self) -> Option<&Log> {
        if self.name != EVM_LOG_EVENT {
            return None;
        }
        self.log.as_ref()
    }
}

/// Supplier of ordered, finalized block batches.
#[async_trait]
pub trait BlockSource: Send {
    /// Next batch of blocks at or above `from_height`, or `None` once exhausted.
    async fn next_batch(&mut self, from_height: u64) -> eyre::Result<Option<Vec<Block>>>;
}

/// Replay log with one JSON-encoded [`Block`] per line.
pub struct JsonLinesSource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
    batch_size: usize,
    last_height: Option<u64>,
}

impl JsonLinesSource {
    pub async fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self, SourceError> {
        let file = File::open(path).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
            batch_size: batch_size.max(1),
            last_height: None,
        })
    }

    async fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            let block: Block = serde_json::from_str(&line).map_err(|source| {
                SourceError::Malformed {
                    line: self.line_no,
                    source,
                }
            })?;

            let height = block.header.height;
            if let Some(previous) = self.last_height {
                if height < previous {
                    return Err(SourceError::OutOfOrder { previous, height });
                }
            }
            self.last_height = Some(height);

            return Ok(Some(block));
        }
        Ok(None)
    }
}

#[async_trait]
impl BlockSource for JsonLinesSource {
    async fn next_batch(&mut self, from_height: u64) -> eyre::Result<Option<Vec<Block>>> {
        let mut blocks = Vec::with_capacity(self.batch_size);

        while blocks.len() < self.batch_size {
            let Some(block) = self.next_block().await? else {
                break;
            };
            if block.header.height < from_height {
                debug!("Skipping block {} below {}", block.header.height, from_height);
                continue;
            }
            blocks.push(block);
        }

        if blocks.is_empty() {
            return Ok(None);
        }
        Ok(Some(blocks))
    }
}
