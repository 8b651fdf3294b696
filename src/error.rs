// Error types
//
// Typed errors for the decoding core and the block source. Orchestration and
// storage layers report through eyre and keep these reachable via downcast.

use alloy_primitives::B256;

/// Fatal decoding failures. Any of these aborts the run before anything is flushed.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The log parsed against the pair interface but is not one of the tracked
    /// Mint/Burn/Swap/Transfer events. Points at a decoder/ABI mismatch.
    #[error("Unknown event topic: {topic}")]
    UnknownTopic { topic: B256 },
}

/// Failures while converting a public key into a display address.
///
/// Never escapes record construction: the transcoder logs these and falls
/// back to the unknown-address sentinel.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address is not 0x-prefixed")]
    MissingPrefix,

    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("unsupported public key length: {0} bytes")]
    InvalidLength(usize),

    #[error("ss58 prefix {0} is out of range")]
    InvalidPrefix(u16),
}

/// Failures of the block source collaborator.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read block source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed block on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Blocks must arrive in non-decreasing height order.
    #[error("block {height} delivered after block {previous}")]
    OutOfOrder { previous: u64, height: u64 },
}
