//! Turns the blocks observed in an epoch into a complete schedule.
//!
//! Every slot with a proposer ends up with at least one block. Slots for which the node returned
//! nothing get a placeholder that is either [`BlockStatus::Scheduled`] or [`BlockStatus::Missed`]
//! depending on how long ago the slot started.

use core::time::Duration;

use anyhow::Result;
use helper_functions::misc;
use types::{
    assignments::EpochAssignments,
    config::Config as ChainConfig,
    consensus::{Block, BlockStatus, EpochBlocks},
    consts::GENESIS_SLOT,
    preset::Preset,
    primitives::{Epoch, Slot, UnixSeconds},
};

/// Slots of `epoch` that may have blocks at time `now`.
///
/// The genesis slot never has a proposed block. Slots that have not started yet are left out.
pub fn slots_to_fetch<P: Preset>(
    chain_config: &ChainConfig,
    epoch: Epoch,
    now: UnixSeconds,
) -> Result<impl Iterator<Item = Slot> + '_> {
    let slots = misc::slots_in_epoch::<P>(epoch)?;

    // A slot whose start time overflows has not started either.
    Ok(slots.filter(move |slot| {
        *slot != GENESIS_SLOT
            && misc::compute_timestamp_at_slot(chain_config, *slot).is_ok_and(|time| time <= now)
    }))
}

/// Status of a placeholder for `slot` at time `now`.
///
/// A slot counts as missed once `grace_period` has passed since its start.
pub fn placeholder_status(
    chain_config: &ChainConfig,
    slot: Slot,
    now: UnixSeconds,
    grace_period: Duration,
) -> Result<BlockStatus> {
    let slot_time = misc::compute_timestamp_at_slot(chain_config, slot)?;

    let status = if slot_time.saturating_add(grace_period.as_secs()) < now {
        BlockStatus::Missed
    } else {
        BlockStatus::Scheduled
    };

    Ok(status)
}

/// Adds `new_blocks` to the blocks of `slot`.
///
/// Blocks are keyed by root, so competing blocks in the same slot are all kept.
/// Slots are only added to `blocks` if `new_blocks` is not empty.
pub fn insert_blocks(
    blocks: &mut EpochBlocks,
    slot: Slot,
    new_blocks: impl IntoIterator<Item = Block>,
) {
    for block in new_blocks {
        blocks
            .entry(slot)
            .or_default()
            .insert(block.block_root, block);
    }
}

/// Adds placeholders for slots of `epoch` that have a proposer but no blocks.
pub fn fill_missing_slots<P: Preset>(
    chain_config: &ChainConfig,
    epoch: Epoch,
    blocks: &mut EpochBlocks,
    assignments: &EpochAssignments,
    now: UnixSeconds,
    grace_period: Duration,
) -> Result<()> {
    let epoch_slots = misc::slots_in_epoch::<P>(epoch)?;

    for (slot, proposer) in assignments.proposer_assignments.range(epoch_slots) {
        let slot = *slot;

        if slot == GENESIS_SLOT || blocks.get(&slot).is_some_and(|blocks| !blocks.is_empty()) {
            continue;
        }

        let status = placeholder_status(chain_config, slot, now, grace_period)?;
        let placeholder = Block::placeholder(slot, *proposer, status);

        insert_blocks(blocks, slot, [placeholder]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;
    use types::{consensus::BlockRoot, preset::Minimal, primitives::H256};

    use super::*;

    const GRACE_PERIOD: Duration = Duration::from_secs(60);

    fn time_at(slot: Slot) -> UnixSeconds {
        misc::compute_timestamp_at_slot(&ChainConfig::minimal(), slot)
            .expect("slot time should fit in a Unix timestamp")
    }

    fn observed_block(slot: Slot, root_byte: u8) -> Block {
        Block {
            status: BlockStatus::Proposed,
            slot,
            block_root: BlockRoot::Observed(H256::repeat_byte(root_byte)),
            ..Block::default()
        }
    }

    #[test]
    fn genesis_and_future_slots_are_not_fetched() -> Result<()> {
        let chain_config = ChainConfig::minimal();

        let slots = slots_to_fetch::<Minimal>(&chain_config, 0, time_at(5))?.collect::<Vec<_>>();
        assert_eq!(slots, [1, 2, 3, 4, 5]);

        let slots = slots_to_fetch::<Minimal>(&chain_config, 1, time_at(100))?.collect::<Vec<_>>();
        assert_eq!(slots, [8, 9, 10, 11, 12, 13, 14, 15]);

        assert_eq!(slots_to_fetch::<Minimal>(&chain_config, 3, time_at(23))?.count(), 0);

        Ok(())
    }

    #[test]
    fn slots_without_representable_start_time_are_not_fetched() -> Result<()> {
        let chain_config = ChainConfig::minimal();
        let last_epoch = Epoch::MAX / 8 - 1;
        let slots = slots_to_fetch::<Minimal>(&chain_config, last_epoch, u64::MAX)?;

        assert_eq!(slots.count(), 0);

        Ok(())
    }

    #[test]
    fn epoch_beyond_last_slot_is_rejected() {
        slots_to_fetch::<Minimal>(&ChainConfig::minimal(), Epoch::MAX / 8, u64::MAX)
            .err()
            .expect("epoch should not fit in a slot range");

        fill_missing_slots::<Minimal>(
            &ChainConfig::minimal(),
            Epoch::MAX,
            &mut EpochBlocks::new(),
            &EpochAssignments::default(),
            u64::MAX,
            GRACE_PERIOD,
        )
        .expect_err("epoch should not fit in a slot range");
    }

    #[test_case(11, time_at(12) + 60 => BlockStatus::Missed; "grace period over")]
    #[test_case(12, time_at(12) + 60 => BlockStatus::Scheduled; "grace period ends now")]
    #[test_case(12, time_at(12) + 61 => BlockStatus::Missed; "grace period just ended")]
    #[test_case(13, time_at(12) => BlockStatus::Scheduled; "slot in the future")]
    fn placeholder_status_depends_on_grace_period(slot: Slot, now: UnixSeconds) -> BlockStatus {
        placeholder_status(&ChainConfig::minimal(), slot, now, GRACE_PERIOD)
            .expect("slot time should fit in a Unix timestamp")
    }

    #[test]
    fn placeholders_are_added_only_for_empty_slots_with_proposers() -> Result<()> {
        let chain_config = ChainConfig::minimal();
        let now = time_at(14) + 30;

        let mut assignments = EpochAssignments::default();
        assignments.proposer_assignments.extend([(8, 80), (9, 90), (15, 150)]);
        // Belongs to the next epoch and must not leak into this one.
        assignments.proposer_assignments.insert(16, 160);

        let mut blocks = EpochBlocks::new();
        insert_blocks(&mut blocks, 9, [observed_block(9, 0x99)]);

        fill_missing_slots::<Minimal>(
            &chain_config,
            1,
            &mut blocks,
            &assignments,
            now,
            GRACE_PERIOD,
        )?;

        assert_eq!(blocks.keys().copied().collect::<Vec<_>>(), [8, 9, 15]);

        let missed = &blocks[&8][&BlockRoot::Missed];
        assert_eq!(missed.status, BlockStatus::Missed);
        assert_eq!(missed.proposer, 80);
        assert_eq!(missed.block_root.as_bytes(), [0x01]);

        assert_eq!(blocks[&9].len(), 1);
        assert!(blocks[&9].values().all(|block| block.status == BlockStatus::Proposed));

        let scheduled = &blocks[&15][&BlockRoot::Scheduled];
        assert_eq!(scheduled.status, BlockStatus::Scheduled);
        assert_eq!(scheduled.proposer, 150);
        assert_eq!(scheduled.block_root.as_bytes(), [0x00]);

        Ok(())
    }

    #[test]
    fn genesis_slot_never_gets_a_placeholder() -> Result<()> {
        let mut assignments = EpochAssignments::default();
        assignments.proposer_assignments.insert(GENESIS_SLOT, 0);

        let mut blocks = EpochBlocks::new();

        fill_missing_slots::<Minimal>(
            &ChainConfig::minimal(),
            0,
            &mut blocks,
            &assignments,
            time_at(100),
            GRACE_PERIOD,
        )?;

        assert!(blocks.is_empty());

        Ok(())
    }

    #[test]
    fn competing_blocks_are_both_kept() {
        let mut blocks = EpochBlocks::new();

        insert_blocks(&mut blocks, 10, [observed_block(10, 0xaa), observed_block(10, 0xbb)]);

        assert_eq!(blocks[&10].len(), 2);
        assert!(blocks[&10].keys().all(|root| root.as_bytes().len() == 32));
    }
}
