// Reefswap V2 Pair Interface
//
// Events the pair contract can emit, and parsing of a raw log against them.
// Parsing is keyed on the first topic; a log whose data does not fit the
// matched event is treated the same as one from an unrelated event.

use crate::types::EventType;
use alloy_primitives::{LogData, B256};
use alloy_sol_types::{sol, SolEvent};

mod pair {
    use super::*;

    sol! {
        #[derive(Debug)]
        event Approval(address indexed owner, address indexed spender, uint256 value);

        #[derive(Debug)]
        event Burn(
            address indexed sender,
            uint256 amount0,
            uint256 amount1,
            address indexed to
        );

        #[derive(Debug)]
        event Mint(address indexed sender, uint256 amount0, uint256 amount1);

        #[derive(Debug)]
        event Swap(
            address indexed sender,
            uint256 amount0In,
            uint256 amount1In,
            uint256 amount0Out,
            uint256 amount1Out,
            address indexed to
        );

        #[derive(Debug)]
        event Sync(uint112 reserve0, uint112 reserve1);

        #[derive(Debug)]
        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

// Re-export with namespaced names (Sync would shadow the marker trait)
pub use pair::{
    Approval as PairApproval, Burn as PairBurn, Mint as PairMint, Swap as PairSwap,
    Sync as PairSync, Transfer as PairTransfer,
};

/// A log parsed against the full pair interface.
#[derive(Debug)]
pub enum PairLog {
    Approval(PairApproval),
    Burn(PairBurn),
    Mint(PairMint),
    Swap(PairSwap),
    Sync(PairSync),
    Transfer(PairTransfer),
}

impl PairLog {
    /// Parse a log, or `None` if it matches no event of the interface.
    pub fn parse(log: &LogData) -> Option<Self> {
        let topic0 = *log.topics().first()?;

        if topic0 == PairApproval::SIGNATURE_HASH {
            PairApproval::decode_log_data(log).ok().map(Self::Approval)
        } else if topic0 == PairBurn::SIGNATURE_HASH {
            PairBurn::decode_log_data(log).ok().map(Self::Burn)
        } else if topic0 == PairMint::SIGNATURE_HASH {
            PairMint::decode_log_data(log).ok().map(Self::Mint)
        } else if topic0 == PairSwap::SIGNATURE_HASH {
            PairSwap::decode_log_data(log).ok().map(Self::Swap)
        } else if topic0 == PairSync::SIGNATURE_HASH {
            PairSync::decode_log_data(log).ok().map(Self::Sync)
        } else if topic0 == PairTransfer::SIGNATURE_HASH {
            PairTransfer::decode_log_data(log).ok().map(Self::Transfer)
        } else {
            None
        }
    }

    /// Signature hash of the parsed event (the log's first topic).
    pub fn topic(&self) -> B256 {
        match self {
            PairLog::Approval(_) => PairApproval::SIGNATURE_HASH,
            PairLog::Burn(_) => PairBurn::SIGNATURE_HASH,
            PairLog::Mint(_) => PairMint::SIGNATURE_HASH,
            PairLog::Swap(_) => PairSwap::SIGNATURE_HASH,
            PairLog::Sync(_) => PairSync::SIGNATURE_HASH,
            PairLog::Transfer(_) => PairTransfer::SIGNATURE_HASH,
        }
    }
}

impl EventType {
    /// Signature hash of the tracked event.
    pub fn topic(&self) -> B256 {
        match self {
            EventType::Mint => PairMint::SIGNATURE_HASH,
            EventType::Burn => PairBurn::SIGNATURE_HASH,
            EventType::Swap => PairSwap::SIGNATURE_HASH,
            EventType::Transfer => PairTransfer::SIGNATURE_HASH,
        }
    }

    /// Tracked event with signature hash `topic`, if any.
    pub fn from_topic(topic: &B256) -> Option<Self> {
        EventType::ALL.into_iter().find(|kind| kind.topic() == *topic)
    }
}
