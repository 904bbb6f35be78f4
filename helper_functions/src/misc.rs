use core::ops::Range;

use anyhow::Result;
use typenum::Unsigned as _;
use types::{
    config::Config,
    consts::GENESIS_SLOT,
    preset::Preset,
    primitives::{Epoch, Slot, UnixSeconds},
};

use crate::error::Error;

#[must_use]
pub const fn compute_epoch_at_slot<P: Preset>(slot: Slot) -> Epoch {
    slot / P::SlotsPerEpoch::U64
}

#[must_use]
pub const fn compute_start_slot_at_epoch<P: Preset>(epoch: Epoch) -> Slot {
    epoch.saturating_mul(P::SlotsPerEpoch::U64)
}

pub fn next_epoch(epoch: Epoch) -> Result<Epoch> {
    epoch
        .checked_add(1)
        .ok_or_else(|| Error::EpochOutOfBounds { epoch }.into())
}

/// Slots of `epoch`. Fails if the end of the range does not fit in a [`Slot`].
pub fn slots_in_epoch<P: Preset>(epoch: Epoch) -> Result<Range<Slot>> {
    let slots_per_epoch = P::SlotsPerEpoch::U64;

    let start = epoch
        .checked_mul(slots_per_epoch)
        .ok_or(Error::EpochOutOfBounds { epoch })?;

    let end = start
        .checked_add(slots_per_epoch)
        .ok_or(Error::EpochOutOfBounds { epoch })?;

    Ok(start..end)
}

/// Start time of `slot` as a Unix timestamp.
pub fn compute_timestamp_at_slot(config: &Config, slot: Slot) -> Result<UnixSeconds> {
    slot.checked_sub(GENESIS_SLOT)
        .and_then(|slots_since_genesis| {
            slots_since_genesis.checked_mul(config.seconds_per_slot.get())
        })
        .and_then(|seconds_since_genesis| config.genesis_time.checked_add(seconds_since_genesis))
        .ok_or_else(|| Error::SlotOutOfBounds { slot }.into())
}
