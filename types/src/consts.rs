use crate::primitives::{Epoch, ExecutionAddress, Slot, ValidatorIndex, H160};

pub const GENESIS_EPOCH: Epoch = 0;
pub const GENESIS_SLOT: Slot = 0;
pub const FAR_FUTURE_EPOCH: Epoch = Epoch::MAX;

/// Stands in for an attester whose committee position has no duty in the epoch's assignments.
///
/// Index 0 belongs to a real validator, so it cannot serve this purpose.
pub const UNKNOWN_VALIDATOR_INDEX: ValidatorIndex = ValidatorIndex::MAX;

/// Root of a placeholder block whose slot has not yet passed the grace period.
pub const SCHEDULED_BLOCK_ROOT: &[u8] = &[0x00];

/// Root of a placeholder block whose proposer failed to produce anything.
pub const MISSED_BLOCK_ROOT: &[u8] = &[0x01];

/// Sender of a transaction whose signature could not be recovered.
pub const UNKNOWN_SENDER: ExecutionAddress = H160::repeat_byte(0xab);
