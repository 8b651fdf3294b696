// Reef Pool Indexer
//
// 1. Reads finalized blocks from a JSON-lines replay log
// 2. Decodes Mint/Burn/Swap/Transfer logs of one Reefswap V2 pair
// 3. Upserts the decoded PoolEvents into Postgres once per block batch
//
// Architecture:
//   Block Source → Event Decoder → Batch → PoolEvent store (+ checkpoint)

use eyre::WrapErr;
use reef_pool_indexer::{
    config::Config, EventMapper, EventType, JsonLinesSource, MemoryStore, PoolEventDb,
    PoolEventStore, Processor, Ss58Codec,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    info!(
        "Contract: {} | Start block: {} | Blocks: {} | Batch size: {}",
        config.contract_address,
        config.start_block,
        config.blocks_file.display(),
        config.batch_size
    );
    for kind in EventType::ALL {
        info!("Tracking {} ({})", kind, kind.topic());
    }

    let codec = Ss58Codec::new(config.ss58_prefix)?;
    info!("Signer addresses use SS58 prefix {}", codec.prefix());
    let source = JsonLinesSource::open(&config.blocks_file, config.batch_size)
        .await
        .wrap_err_with(|| format!("opening {}", config.blocks_file.display()))?;

    let store: Arc<dyn PoolEventStore> = if config.dry_run {
        info!("Dry run: pool events are kept in memory");
        Arc::new(MemoryStore::new())
    } else {
        info!("Connecting to PostgreSQL at {}", config.redacted_database_url());
        Arc::new(PoolEventDb::new(&config.database_url).await?)
    };

    let mut processor = Processor::new(
        source,
        store,
        config.contract_address,
        EventMapper::new(codec),
        config.start_block,
    );
    let stats = processor.run().await?;

    info!(
        "Done: {} batches, {} blocks, {} pool events (last block {:?})",
        stats.batches, stats.blocks, stats.events, stats.last_block
    );
    Ok(())
}
