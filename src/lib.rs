// Reef Pool Indexer Library
//
// Decodes the Mint/Burn/Swap/Transfer logs of one Reefswap V2 pair into
// PoolEvent records and saves them once per block batch.

pub mod address;
pub mod config;
pub mod error;
pub mod pool_events;
pub mod processor;
pub mod source;
pub mod types;

// Re-export commonly used items for testing
pub use address::{Ss58Codec, UNKNOWN_ADDRESS};
pub use error::{AddressError, DecodeError, SourceError};
pub use pool_events::{EventMapper, MemoryStore, PoolEventBatch, PoolEventDb, PoolEventStore};
pub use processor::{process_blocks, BatchSummary, Processor, ProcessorStats};
pub use source::{Block, BlockHeader, BlockSource, EventEntry, ExtrinsicRef, JsonLinesSource};
pub use types::{Amount, EventType, PoolEvent};
