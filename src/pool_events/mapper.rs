// Event Classifier & Mapper
//
// Turns one EVM log of the tracked pair into a PoolEvent record.

use super::events::PairLog;
use crate::address::Ss58Codec;
use crate::error::DecodeError;
use crate::source::{BlockHeader, EventEntry};
use crate::types::{Amount, EventType, PoolEvent};
use alloy_primitives::{Address, Log};

/// Event-specific fields, filled in by exactly one mapping rule.
struct EventFields {
    event_type: EventType,
    sender: Address,
    to: Option<Address>,
    amount1: Amount,
    amount2: Option<Amount>,
    amount_in1: Option<Amount>,
    amount_in2: Option<Amount>,
}

/// Maps pair logs to records, transcoding signer keys with `codec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventMapper {
    codec: Ss58Codec,
}

impl EventMapper {
    pub fn new(codec: Ss58Codec) -> Self {
        Self { codec }
    }

    /// Decode `log` (carried by `entry` in the block with `header`).
    ///
    /// Returns `Ok(None)` when the log is not part of the pair interface.
    /// A log that parses but is not one of the four tracked events is an
    /// [`DecodeError::UnknownTopic`].
    pub fn decode(
        &self,
        header: &BlockHeader,
        entry: &EventEntry,
        log: &Log,
    ) -> Result<Option<PoolEvent>, DecodeError> {
        let Some(parsed) = PairLog::parse(&log.data) else {
            return Ok(None);
        };

        // Base fields, shared by every event kind
        let signer = entry
            .extrinsic
            .as_ref()
            .and_then(|extrinsic| extrinsic.signer.as_deref());
        let signer_address = self.codec.to_native_address(signer);
        let index_in_block = entry
            .extrinsic
            .as_ref()
            .map_or(entry.index_in_block, |extrinsic| extrinsic.index_in_block);

        let fields = map_fields(parsed)?;

        Ok(Some(PoolEvent {
            id: entry.id.clone(),
            event_type: fields.event_type,
            to_address: fields.to.map(to_checksum),
            sender_address: Some(to_checksum(fields.sender)),
            signer_address: Some(signer_address),
            block_height: header.height,
            index_in_block,
            amount1: Some(fields.amount1),
            amount2: fields.amount2,
            amount_in1: fields.amount_in1,
            amount_in2: fields.amount_in2,
            timestamp: header.timestamp,
        }))
    }
}

fn map_fields(parsed: PairLog) -> Result<EventFields, DecodeError> {
    let fields = match parsed {
        PairLog::Mint(event) => EventFields {
            event_type: EventType::Mint,
            sender: event.sender,
            to: None,
            amount1: event.amount0.into(),
            amount2: Some(event.amount1.into()),
            amount_in1: None,
            amount_in2: None,
        },
        PairLog::Burn(event) => EventFields {
            event_type: EventType::Burn,
            sender: event.sender,
            to: Some(event.to),
            amount1: event.amount0.into(),
            amount2: Some(event.amount1.into()),
            amount_in1: None,
            amount_in2: None,
        },
        PairLog::Swap(event) => EventFields {
            event_type: EventType::Swap,
            sender: event.sender,
            to: Some(event.to),
            amount1: event.amount0Out.into(),
            amount2: Some(event.amount1Out.into()),
            amount_in1: Some(event.amount0In.into()),
            amount_in2: Some(event.amount1In.into()),
        },
        PairLog::Transfer(event) => EventFields {
            event_type: EventType::Transfer,
            sender: event.from,
            to: Some(event.to),
            amount1: event.value.into(),
            amount2: None,
            amount_in1: None,
            amount_in2: None,
        },
        untracked @ (PairLog::Approval(_) | PairLog::Sync(_)) => {
            return Err(DecodeError::UnknownTopic {
                topic: untracked.topic(),
            });
        }
    };
    Ok(fields)
}

/// Convert an Address to EIP-55 checksummed hex string.
fn to_checksum(addr: Address) -> String {
    addr.to_checksum(None)
}
