use anyhow::Result;
use async_trait::async_trait;
use types::{
    assignments::EpochAssignments,
    consensus::{Attestation, Block, ChainHead, Validator, ValidatorQueue},
    primitives::{Epoch, Gwei, Slot},
};

/// Balances behind the participation figures of one epoch.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ParticipationBalances {
    pub target_attesting_gwei: Gwei,
    pub active_gwei: Gwei,
}

/// Raw access to a beacon node over a single wire protocol.
///
/// Implementations translate responses into the canonical data model without enriching them.
/// Caching, placeholder blocks and attester resolution are layered on top by [`BeaconApi`].
///
/// [`BeaconApi`]: crate::BeaconApi
#[async_trait]
pub trait Backend: Send + Sync {
    async fn chain_head(&self) -> Result<ChainHead>;

    /// Proposer and attester duties of `epoch`, computed from scratch.
    async fn epoch_assignments(&self, epoch: Epoch) -> Result<EpochAssignments>;

    /// Blocks at `slot` as returned by the node.
    ///
    /// `proposer` may be left unset and `attesters` are always empty.
    async fn blocks_by_slot(&self, slot: Slot) -> Result<Vec<Block>>;

    /// Every validator in the registry at the start of `epoch`.
    async fn validators(&self, epoch: Epoch) -> Result<Vec<Validator>>;

    async fn validator_queue(&self) -> Result<ValidatorQueue>;

    /// Attestations waiting for inclusion. `attesters` are always empty.
    async fn attestation_pool(&self) -> Result<Vec<Attestation>>;

    /// Balances describing participation in `epoch`.
    async fn participation_balances(&self, epoch: Epoch) -> Result<ParticipationBalances>;
}
