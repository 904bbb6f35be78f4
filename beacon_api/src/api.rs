use core::{marker::PhantomData, time::Duration};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use helper_functions::misc;
use log::{info, warn};
use types::{
    assignments::EpochAssignments,
    config::Config as ChainConfig,
    consensus::{
        Attestation, Block, ChainHead, EpochBlocks, EpochData, ValidatorParticipation,
        ValidatorQueue,
    },
    preset::Preset,
    primitives::{Epoch, Slot, UnixSeconds},
};

use crate::{
    assignment_cache::AssignmentCache,
    attestation_resolution,
    backend::Backend,
    block_synthesis,
    client::Client,
    config::{BackendKind, Config},
    grpc::backend::GrpcBackend,
    participation,
    rest::backend::RestBackend,
};

/// Connects to the beacon node described by `config`.
///
/// The gRPC channel is established lazily, so this must be called from within a Tokio runtime.
pub fn connect<P: Preset>(
    chain_config: Arc<ChainConfig>,
    config: &Config,
) -> Result<Arc<dyn Client>> {
    info!("using {} beacon node at {}", config.backend, config.url);

    let client: Arc<dyn Client> = match config.backend {
        BackendKind::Grpc => {
            let backend = GrpcBackend::<P>::new(config)?;
            Arc::new(BeaconApi::<P, _>::new(chain_config, config, backend))
        }
        BackendKind::Rest => {
            let backend = RestBackend::<P>::new(config)?;
            Arc::new(BeaconApi::<P, _>::new(chain_config, config, backend))
        }
    };

    Ok(client)
}

/// [`Client`] built on top of any [`Backend`].
pub struct BeaconApi<P: Preset, B> {
    chain_config: Arc<ChainConfig>,
    backend: B,
    assignment_cache: AssignmentCache,
    missed_slot_grace_period: Duration,
    phantom: PhantomData<P>,
}

impl<P: Preset, B: Backend> BeaconApi<P, B> {
    #[must_use]
    pub fn new(chain_config: Arc<ChainConfig>, config: &Config, backend: B) -> Self {
        Self {
            chain_config,
            backend,
            assignment_cache: AssignmentCache::new(config.assignment_cache_capacity),
            missed_slot_grace_period: config.missed_slot_grace_period,
            phantom: PhantomData,
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Same as [`Client::get_epoch_data`] but with the current time passed in.
    pub async fn get_epoch_data_at(&self, epoch: Epoch, now: UnixSeconds) -> Result<EpochData> {
        let assignments = self.get_epoch_assignments(epoch).await?;

        let validators = self
            .backend
            .validators(epoch)
            .await
            .with_context(|| format!("failed to fetch validators for epoch {epoch}"))?;

        let mut blocks = EpochBlocks::new();

        let slots = block_synthesis::slots_to_fetch::<P>(&self.chain_config, epoch, now)
            .with_context(|| format!("failed to list slots of epoch {epoch}"))?;

        for slot in slots {
            let blocks_in_slot = self.get_blocks_by_slot(slot).await?;
            block_synthesis::insert_blocks(&mut blocks, slot, blocks_in_slot);
        }

        block_synthesis::fill_missing_slots::<P>(
            &self.chain_config,
            epoch,
            &mut blocks,
            &assignments,
            now,
            self.missed_slot_grace_period,
        )
        .with_context(|| format!("failed to add placeholders to epoch {epoch}"))?;

        let epoch_participation_stats = match self.get_validator_participation(epoch).await {
            Ok(participation) => participation,
            Err(error) => {
                warn!("participation figures for epoch {epoch} are unavailable: {error:#}");
                ValidatorParticipation::unavailable(epoch)
            }
        };

        Ok(EpochData {
            epoch,
            validators,
            validator_assignments: assignments,
            blocks,
            epoch_participation_stats,
        })
    }

    async fn resolve_attestations(&self, attestations: &mut [Attestation]) -> Result<()> {
        for attestation in attestations {
            let epoch = misc::compute_epoch_at_slot::<P>(attestation.data.slot);
            let assignments = self.get_epoch_assignments(epoch).await?;
            attestation_resolution::resolve_in_place(attestation, &assignments)?;
        }

        Ok(())
    }
}

#[async_trait]
impl<P: Preset, B: Backend> Client for BeaconApi<P, B> {
    async fn get_chain_head(&self) -> Result<ChainHead> {
        self.backend
            .chain_head()
            .await
            .context("failed to fetch chain head")
    }

    async fn get_epoch_data(&self, epoch: Epoch) -> Result<EpochData> {
        self.get_epoch_data_at(epoch, unix_now()?).await
    }

    async fn get_validator_queue(&self) -> Result<ValidatorQueue> {
        self.backend
            .validator_queue()
            .await
            .context("failed to fetch validator queue")
    }

    async fn get_attestation_pool(&self) -> Result<Vec<Attestation>> {
        let mut attestations = self
            .backend
            .attestation_pool()
            .await
            .context("failed to fetch attestation pool")?;

        self.resolve_attestations(&mut attestations)
            .await
            .context("failed to resolve attestations in pool")?;

        Ok(attestations)
    }

    async fn get_epoch_assignments(&self, epoch: Epoch) -> Result<Arc<EpochAssignments>> {
        self.assignment_cache
            .get_or_compute(epoch, || self.backend.epoch_assignments(epoch))
            .await
            .with_context(|| format!("failed to compute assignments for epoch {epoch}"))
    }

    async fn get_blocks_by_slot(&self, slot: Slot) -> Result<Vec<Block>> {
        let mut blocks = self
            .backend
            .blocks_by_slot(slot)
            .await
            .with_context(|| format!("failed to fetch blocks at slot {slot}"))?;

        if blocks.is_empty() {
            return Ok(blocks);
        }

        let epoch = misc::compute_epoch_at_slot::<P>(slot);
        let assignments = self.get_epoch_assignments(epoch).await?;

        for block in &mut blocks {
            if let Some(proposer) = assignments.proposer(slot) {
                block.proposer = proposer;
            }

            self.resolve_attestations(&mut block.attestations)
                .await
                .with_context(|| format!("failed to resolve attestations at slot {slot}"))?;
        }

        Ok(blocks)
    }

    async fn get_validator_participation(&self, epoch: Epoch) -> Result<ValidatorParticipation> {
        let balances = self
            .backend
            .participation_balances(epoch)
            .await
            .with_context(|| format!("failed to fetch participation for epoch {epoch}"))?;

        Ok(participation::aggregate(epoch, balances))
    }
}

fn unix_now() -> Result<UnixSeconds> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}
