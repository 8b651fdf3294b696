mod batch;
mod db;
pub mod events;
mod mapper;
mod store;

pub use batch::PoolEventBatch;
pub use db::PoolEventDb;
pub use events::PairLog;
pub use mapper::EventMapper;
pub use store::{MemoryStore, PoolEventStore};
