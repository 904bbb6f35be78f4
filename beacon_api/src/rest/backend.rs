use core::marker::PhantomData;

use anyhow::{bail, Result};
use async_trait::async_trait;
use helper_functions::misc;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use types::{
    assignments::{AttesterKey, EpochAssignments},
    consensus::{Attestation, Block, ChainHead, Validator, ValidatorQueue},
    consts::FAR_FUTURE_EPOCH,
    preset::Preset,
    primitives::{Epoch, Slot, H256},
    redacting_url::RedactingUrl,
};

use crate::{
    backend::{Backend, ParticipationBalances},
    config::Config,
    error::Error,
    rest::containers::{BlockResponse, GlobalVotes, HeadResponse, ValidatorDuty, ValidatorResponse},
};

const MIN_PER_EPOCH_CHURN_LIMIT: u64 = 4;
const CHURN_LIMIT_QUOTIENT: u64 = 1 << 16;

/// [`Backend`] for the Lighthouse HTTP API.
pub struct RestBackend<P: Preset> {
    client: Client,
    base_url: RedactingUrl,
    phantom: PhantomData<P>,
}

impl<P: Preset> RestBackend<P> {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            phantom: PhantomData,
        })
    }

    fn url(&self, path: &str) -> Result<RedactingUrl> {
        self.base_url.join(path).map_err(Into::into)
    }

    /// Sends a `GET` request and decodes the response. Returns `None` if the node answers with 404.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, u64)],
    ) -> Result<Option<T>> {
        let url = self.url(path)?;

        debug!("GET {url}");

        let response = self.client.get(url.into_url()).query(query).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = handle_error(response).await?;

        Ok(Some(response.json().await?))
    }

    async fn get_required<T: DeserializeOwned>(
        &self,
        path: &'static str,
        query: &[(&str, u64)],
    ) -> Result<T> {
        match self.get(path, query).await? {
            Some(value) => Ok(value),
            None => bail!(Error::BadRequest {
                status: StatusCode::NOT_FOUND,
                message: format!("{path} not found"),
            }),
        }
    }

    async fn head(&self) -> Result<HeadResponse> {
        self.get_required("beacon/head", &[]).await
    }

    async fn validators_at_slot(&self, slot: Slot) -> Result<Vec<Validator>> {
        let state_root = self
            .get_required::<H256>("beacon/state_root", &[("slot", slot)])
            .await?;

        let url = self.url("beacon/validators/all")?;

        let response = self
            .client
            .get(url.into_url())
            .query(&[("state_root", format!("{state_root:?}"))])
            .send()
            .await?;

        let validators = handle_error(response)
            .await?
            .json::<Vec<ValidatorResponse>>()
            .await?
            .into_iter()
            .filter_map(ValidatorResponse::into_validator)
            .collect();

        Ok(validators)
    }
}

#[async_trait]
impl<P: Preset> Backend for RestBackend<P> {
    async fn chain_head(&self) -> Result<ChainHead> {
        let head = self.head().await?;

        Ok(ChainHead {
            head_slot: head.slot,
            head_epoch: misc::compute_epoch_at_slot::<P>(head.slot),
            head_block_root: head.block_root,
            finalized_slot: head.finalized_slot,
            finalized_epoch: misc::compute_epoch_at_slot::<P>(head.finalized_slot),
            finalized_block_root: head.finalized_block_root,
            justified_slot: head.justified_slot,
            justified_epoch: misc::compute_epoch_at_slot::<P>(head.justified_slot),
            justified_block_root: head.justified_block_root,
            previous_justified_slot: head.previous_justified_slot,
            previous_justified_epoch: misc::compute_epoch_at_slot::<P>(
                head.previous_justified_slot,
            ),
            previous_justified_block_root: head.previous_justified_block_root,
        })
    }

    async fn epoch_assignments(&self, epoch: Epoch) -> Result<EpochAssignments> {
        let duties = self
            .get_required::<Vec<ValidatorDuty>>("validator/duties/active", &[("epoch", epoch)])
            .await?;

        Ok(assignments_from_duties(duties))
    }

    async fn blocks_by_slot(&self, slot: Slot) -> Result<Vec<Block>> {
        let Some(response) = self
            .get::<BlockResponse>("beacon/block", &[("slot", slot)])
            .await?
        else {
            return Ok(vec![]);
        };

        // Lighthouse answers with the latest block at or before the requested slot.
        let block_slot = response.beacon_block.message.slot;

        if block_slot != slot {
            debug!("no block at slot {slot} (node returned block at slot {block_slot})");
            return Ok(vec![]);
        }

        Ok(vec![response.into()])
    }

    async fn validators(&self, epoch: Epoch) -> Result<Vec<Validator>> {
        self.validators_at_slot(misc::compute_start_slot_at_epoch::<P>(epoch))
            .await
    }

    async fn validator_queue(&self) -> Result<ValidatorQueue> {
        let head = self.head().await?;
        let head_epoch = misc::compute_epoch_at_slot::<P>(head.slot);
        let validators = self.validators_at_slot(head.slot).await?;

        Ok(validator_queue(&validators, head_epoch))
    }

    async fn attestation_pool(&self) -> Result<Vec<Attestation>> {
        debug!("REST backend has no attestation pool endpoint");
        Ok(vec![])
    }

    async fn participation_balances(&self, epoch: Epoch) -> Result<ParticipationBalances> {
        // Figures for an epoch are only final once the next one has been processed.
        let next_epoch = misc::next_epoch(epoch)?;

        let votes = self
            .get_required::<GlobalVotes>("consensus/global_votes", &[("epoch", next_epoch)])
            .await?;

        Ok(ParticipationBalances {
            target_attesting_gwei: votes.previous_epoch_target_attesting_gwei,
            active_gwei: votes.previous_epoch_active_gwei,
        })
    }
}

fn assignments_from_duties(duties: Vec<ValidatorDuty>) -> EpochAssignments {
    let mut assignments = EpochAssignments::default();

    for duty in duties {
        let Some(validator_index) = duty.validator_index else {
            debug!("skipping duties of unknown validator {:?}", duty.validator_pubkey);
            continue;
        };

        for slot in duty.block_proposal_slots {
            assignments.proposer_assignments.insert(slot, validator_index);
        }

        if let (Some(slot), Some(committee_index), Some(position)) = (
            duty.attestation_slot,
            duty.attestation_committee_index,
            duty.attestation_committee_position,
        ) {
            assignments.attester_assignments.insert(
                AttesterKey {
                    slot,
                    committee_index,
                    position,
                },
                validator_index,
            );
        }
    }

    assignments
}

fn validator_queue(validators: &[Validator], head_epoch: Epoch) -> ValidatorQueue {
    let mut queue = ValidatorQueue::default();
    let mut active_count = 0;

    for validator in validators {
        let eligible = validator.activation_eligibility_epoch != FAR_FUTURE_EPOCH;

        if validator.activation_epoch <= head_epoch && head_epoch < validator.exit_epoch {
            active_count += 1;
        }

        if eligible && validator.activation_epoch > head_epoch {
            queue.activation_public_keys.push(validator.public_key);
            queue.activation_validator_indices.push(validator.index);
        }

        if validator.exit_epoch != FAR_FUTURE_EPOCH && validator.exit_epoch > head_epoch {
            queue.exit_public_keys.push(validator.public_key);
            queue.exit_validator_indices.push(validator.index);
        }
    }

    queue.churn_limit = (active_count / CHURN_LIMIT_QUOTIENT).max(MIN_PER_EPOCH_CHURN_LIMIT);

    queue
}

async fn handle_error(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_client_error() {
        let message = response.text().await?;
        bail!(Error::BadRequest { status, message });
    }

    if status.is_server_error() {
        let message = response.text().await?;
        bail!(Error::NodeInternalError { status, message });
    }

    Ok(response)
}
