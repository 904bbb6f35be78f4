//! Conversions from Prysm protobuf messages into the canonical data model.
//!
//! Protobuf has no fixed-size byte arrays, so every root, key and signature is length-checked.

use std::collections::HashMap;

use anyhow::{Error as AnyhowError, Result};
use helper_functions::misc;
use types::{
    assignments::EpochAssignments,
    consensus::{
        Attestation, AttestationData, AttesterSlashing, BeaconBlockHeader, Block, BlockRoot,
        BlockStatus, ChainHead, Checkpoint, Deposit, DepositData, Eth1Data, IndexedAttestation,
        ProposerSlashing, SignedBeaconBlockHeader, SignedVoluntaryExit, Validator,
        ValidatorQueue, VoluntaryExit,
    },
    preset::Preset,
    primitives::{Epoch, Gwei, PublicKeyBytes, SignatureBytes, ValidatorIndex, H256},
};

use crate::{backend::ParticipationBalances, error::Error, grpc::proto};

fn fixed<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        AnyhowError::new(Error::InvalidLength {
            field,
            expected: N,
            actual: bytes.len(),
        })
    })
}

pub fn h256(field: &'static str, bytes: &[u8]) -> Result<H256> {
    fixed(field, bytes).map(H256)
}

pub fn public_key(field: &'static str, bytes: &[u8]) -> Result<PublicKeyBytes> {
    fixed(field, bytes).map(PublicKeyBytes)
}

fn signature(field: &'static str, bytes: &[u8]) -> Result<SignatureBytes> {
    fixed(field, bytes).map(SignatureBytes)
}

fn required<T>(field: &'static str, message: Option<T>) -> Result<T> {
    message.ok_or_else(|| Error::MissingField { field }.into())
}

pub fn chain_head<P: Preset>(chain_head: &proto::ChainHead) -> Result<ChainHead> {
    Ok(ChainHead {
        head_slot: chain_head.head_slot,
        head_epoch: misc::compute_epoch_at_slot::<P>(chain_head.head_slot),
        head_block_root: h256("head_block_root", &chain_head.head_block_root)?,
        finalized_slot: chain_head.finalized_slot,
        finalized_epoch: misc::compute_epoch_at_slot::<P>(chain_head.finalized_slot),
        finalized_block_root: h256("finalized_block_root", &chain_head.finalized_block_root)?,
        justified_slot: chain_head.justified_slot,
        justified_epoch: misc::compute_epoch_at_slot::<P>(chain_head.justified_slot),
        justified_block_root: h256("justified_block_root", &chain_head.justified_block_root)?,
        previous_justified_slot: chain_head.previous_justified_slot,
        previous_justified_epoch: misc::compute_epoch_at_slot::<P>(
            chain_head.previous_justified_slot,
        ),
        previous_justified_block_root: h256(
            "previous_justified_block_root",
            &chain_head.previous_justified_block_root,
        )?,
    })
}

impl TryFrom<proto::BeaconBlockContainer> for Block {
    type Error = AnyhowError;

    fn try_from(container: proto::BeaconBlockContainer) -> Result<Self> {
        let signed_block = required("block", container.block)?;
        let block = required("block.block", signed_block.block)?;
        let body = required("block.block.body", block.body)?;
        let eth1_data = required("body.eth1_data", body.eth1_data)?;

        Ok(Self {
            status: BlockStatus::Proposed,
            slot: block.slot,
            proposer: block.proposer_index,
            block_root: BlockRoot::Observed(h256("block_root", &container.block_root)?),
            parent_root: h256("parent_root", &block.parent_root)?,
            state_root: h256("state_root", &block.state_root)?,
            signature: signature("signature", &signed_block.signature)?,
            randao_reveal: signature("randao_reveal", &body.randao_reveal)?,
            graffiti: h256("graffiti", &body.graffiti)?,
            eth1_data: eth1_data.try_into()?,
            proposer_slashings: convert_all(body.proposer_slashings)?,
            attester_slashings: convert_all(body.attester_slashings)?,
            attestations: convert_all(body.attestations)?,
            deposits: convert_all(body.deposits)?,
            voluntary_exits: convert_all(body.voluntary_exits)?,
        })
    }
}

pub fn convert_all<T, U>(messages: Vec<T>) -> Result<Vec<U>>
where
    U: TryFrom<T, Error = AnyhowError>,
{
    messages.into_iter().map(U::try_from).collect()
}

impl TryFrom<proto::Eth1Data> for Eth1Data {
    type Error = AnyhowError;

    fn try_from(eth1_data: proto::Eth1Data) -> Result<Self> {
        Ok(Self {
            deposit_root: h256("deposit_root", &eth1_data.deposit_root)?,
            deposit_count: eth1_data.deposit_count,
            block_hash: h256("block_hash", &eth1_data.block_hash)?,
        })
    }
}

impl TryFrom<proto::Checkpoint> for Checkpoint {
    type Error = AnyhowError;

    fn try_from(checkpoint: proto::Checkpoint) -> Result<Self> {
        Ok(Self {
            epoch: checkpoint.epoch,
            root: h256("checkpoint.root", &checkpoint.root)?,
        })
    }
}

impl TryFrom<proto::AttestationData> for AttestationData {
    type Error = AnyhowError;

    fn try_from(data: proto::AttestationData) -> Result<Self> {
        Ok(Self {
            slot: data.slot,
            index: data.committee_index,
            beacon_block_root: h256("beacon_block_root", &data.beacon_block_root)?,
            source: required("data.source", data.source)?.try_into()?,
            target: required("data.target", data.target)?.try_into()?,
        })
    }
}

impl TryFrom<proto::Attestation> for Attestation {
    type Error = AnyhowError;

    fn try_from(attestation: proto::Attestation) -> Result<Self> {
        Ok(Self {
            aggregation_bits: attestation.aggregation_bits,
            attesters: vec![],
            data: required("attestation.data", attestation.data)?.try_into()?,
            signature: signature("attestation.signature", &attestation.signature)?,
        })
    }
}

impl TryFrom<proto::SignedBeaconBlockHeader> for SignedBeaconBlockHeader {
    type Error = AnyhowError;

    fn try_from(signed_header: proto::SignedBeaconBlockHeader) -> Result<Self> {
        let header = required("signed_header.header", signed_header.header)?;

        Ok(Self {
            message: BeaconBlockHeader {
                slot: header.slot,
                proposer_index: header.proposer_index,
                parent_root: h256("header.parent_root", &header.parent_root)?,
                state_root: h256("header.state_root", &header.state_root)?,
                body_root: h256("header.body_root", &header.body_root)?,
            },
            signature: signature("signed_header.signature", &signed_header.signature)?,
        })
    }
}

impl TryFrom<proto::ProposerSlashing> for ProposerSlashing {
    type Error = AnyhowError;

    fn try_from(slashing: proto::ProposerSlashing) -> Result<Self> {
        Ok(Self {
            signed_header_1: required("header_1", slashing.header_1)?.try_into()?,
            signed_header_2: required("header_2", slashing.header_2)?.try_into()?,
        })
    }
}

impl TryFrom<proto::IndexedAttestation> for IndexedAttestation {
    type Error = AnyhowError;

    fn try_from(attestation: proto::IndexedAttestation) -> Result<Self> {
        Ok(Self {
            attesting_indices: attestation.attesting_indices,
            data: required("indexed_attestation.data", attestation.data)?.try_into()?,
            signature: signature("indexed_attestation.signature", &attestation.signature)?,
        })
    }
}

impl TryFrom<proto::AttesterSlashing> for AttesterSlashing {
    type Error = AnyhowError;

    fn try_from(slashing: proto::AttesterSlashing) -> Result<Self> {
        Ok(Self {
            attestation_1: required("attestation_1", slashing.attestation_1)?.try_into()?,
            attestation_2: required("attestation_2", slashing.attestation_2)?.try_into()?,
        })
    }
}

impl TryFrom<proto::Deposit> for Deposit {
    type Error = AnyhowError;

    fn try_from(deposit: proto::Deposit) -> Result<Self> {
        let data = required("deposit.data", deposit.data)?;

        let proof = deposit
            .proof
            .iter()
            .map(|node| h256("deposit.proof", node))
            .collect::<Result<_>>()?;

        Ok(Self {
            proof,
            data: DepositData {
                pubkey: public_key("deposit.data.public_key", &data.public_key)?,
                withdrawal_credentials: h256(
                    "deposit.data.withdrawal_credentials",
                    &data.withdrawal_credentials,
                )?,
                amount: data.amount,
                signature: signature("deposit.data.signature", &data.signature)?,
            },
        })
    }
}

impl TryFrom<proto::SignedVoluntaryExit> for SignedVoluntaryExit {
    type Error = AnyhowError;

    fn try_from(signed_exit: proto::SignedVoluntaryExit) -> Result<Self> {
        let exit = required("signed_exit.exit", signed_exit.exit)?;

        Ok(Self {
            message: VoluntaryExit {
                epoch: exit.epoch,
                validator_index: exit.validator_index,
            },
            signature: signature("signed_exit.signature", &signed_exit.signature)?,
        })
    }
}

pub fn validator(
    container: proto::validators::ValidatorContainer,
    balance: Gwei,
) -> Result<Validator> {
    let validator = required("validator", container.validator)?;

    Ok(Validator {
        index: container.index,
        public_key: public_key("validator.public_key", &validator.public_key)?,
        withdrawal_credentials: h256(
            "validator.withdrawal_credentials",
            &validator.withdrawal_credentials,
        )?,
        balance,
        effective_balance: validator.effective_balance,
        slashed: validator.slashed,
        activation_eligibility_epoch: validator.activation_eligibility_epoch,
        activation_epoch: validator.activation_epoch,
        exit_epoch: validator.exit_epoch,
        withdrawable_epoch: validator.withdrawable_epoch,
    })
}

pub fn validator_queue(queue: proto::ValidatorQueue) -> Result<ValidatorQueue> {
    let public_keys = |field: &'static str, keys: Vec<Vec<u8>>| {
        keys.iter()
            .map(|key| public_key(field, key))
            .collect::<Result<Vec<_>>>()
    };

    Ok(ValidatorQueue {
        churn_limit: queue.churn_limit,
        activation_public_keys: public_keys(
            "activation_public_keys",
            queue.activation_public_keys,
        )?,
        exit_public_keys: public_keys("exit_public_keys", queue.exit_public_keys)?,
        activation_validator_indices: queue.activation_validator_indices,
        exit_validator_indices: queue.exit_validator_indices,
    })
}

/// Participation figures describing the epoch before the one in `response`.
pub fn participation_balances(
    response: proto::ValidatorParticipationResponse,
) -> Result<ParticipationBalances> {
    let participation = required("participation", response.participation)?;

    Ok(ParticipationBalances {
        target_attesting_gwei: participation.previous_epoch_target_attesting_gwei,
        active_gwei: participation.previous_epoch_active_gwei,
    })
}

/// Builds duty maps from committee assignments.
///
/// Assignments identify validators by public key. `indices` must map every such key to an index.
pub fn epoch_assignments(
    epoch: Epoch,
    committee_assignments: &[proto::validator_assignments::CommitteeAssignment],
    indices: &HashMap<PublicKeyBytes, ValidatorIndex>,
) -> Result<EpochAssignments> {
    let mut assignments = EpochAssignments::default();

    for assignment in committee_assignments {
        let proposer_slots = assignment.proposer_slots.iter().filter(|slot| **slot != 0);

        for slot in proposer_slots {
            let key = public_key("assignment.public_key", &assignment.public_key)?;

            let validator_index = *indices.get(&key).ok_or(Error::UnknownPublicKey {
                public_key: key,
                epoch,
            })?;

            assignments.proposer_assignments.insert(*slot, validator_index);
        }

        assignments.insert_committee(
            assignment.attester_slot,
            assignment.committee_index,
            assignment.beacon_committees.iter().copied(),
        );
    }

    Ok(assignments)
}
