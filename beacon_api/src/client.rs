use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use types::{
    assignments::EpochAssignments,
    consensus::{Attestation, Block, ChainHead, EpochData, ValidatorParticipation, ValidatorQueue},
    primitives::{Epoch, Slot},
};

/// Normalized view of a beacon node, independent of the protocol used to reach it.
#[async_trait]
pub trait Client: Send + Sync {
    async fn get_chain_head(&self) -> Result<ChainHead>;

    /// Assignments, validators, blocks and participation of `epoch`.
    ///
    /// Slots with a proposer but no observed block get a placeholder block.
    async fn get_epoch_data(&self, epoch: Epoch) -> Result<EpochData>;

    async fn get_validator_queue(&self) -> Result<ValidatorQueue>;

    async fn get_attestation_pool(&self) -> Result<Vec<Attestation>>;

    async fn get_epoch_assignments(&self, epoch: Epoch) -> Result<Arc<EpochAssignments>>;

    /// Every block observed at `slot`. More than one means the slot was forked.
    ///
    /// An empty result only means that no block has been observed.
    /// It does not imply that the slot was missed.
    async fn get_blocks_by_slot(&self, slot: Slot) -> Result<Vec<Block>>;

    async fn get_validator_participation(&self, epoch: Epoch) -> Result<ValidatorParticipation>;
}
