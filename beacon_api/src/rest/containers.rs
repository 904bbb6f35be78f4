//! Response bodies of the Lighthouse HTTP API.

use serde::Deserialize;
use types::{
    consensus::{
        Attestation, AttesterSlashing, Block, BlockRoot, BlockStatus, Deposit, Eth1Data,
        ProposerSlashing, SignedVoluntaryExit, Validator,
    },
    primitives::{Epoch, Gwei, PublicKeyBytes, SignatureBytes, Slot, ValidatorIndex, H256},
};

#[derive(Debug, Deserialize)]
pub struct HeadResponse {
    #[serde(with = "serde_utils::string_or_native")]
    pub slot: Slot,
    pub block_root: H256,
    #[serde(with = "serde_utils::string_or_native")]
    pub finalized_slot: Slot,
    pub finalized_block_root: H256,
    #[serde(with = "serde_utils::string_or_native")]
    pub justified_slot: Slot,
    pub justified_block_root: H256,
    #[serde(with = "serde_utils::string_or_native")]
    pub previous_justified_slot: Slot,
    pub previous_justified_block_root: H256,
}

#[derive(Debug, Deserialize)]
pub struct ValidatorDuty {
    pub validator_pubkey: PublicKeyBytes,
    #[serde(default, with = "serde_utils::string_or_native::option")]
    pub validator_index: Option<ValidatorIndex>,
    #[serde(default, with = "serde_utils::string_or_native::option")]
    pub attestation_slot: Option<Slot>,
    #[serde(default, with = "serde_utils::string_or_native::option")]
    pub attestation_committee_index: Option<u64>,
    #[serde(default, with = "serde_utils::string_or_native::option")]
    pub attestation_committee_position: Option<u64>,
    #[serde(default)]
    pub block_proposal_slots: Vec<Slot>,
}

#[derive(Debug, Deserialize)]
pub struct BlockResponse {
    pub root: H256,
    pub beacon_block: SignedBeaconBlock,
}

#[derive(Debug, Deserialize)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: SignatureBytes,
}

#[derive(Debug, Deserialize)]
pub struct BeaconBlock {
    #[serde(with = "serde_utils::string_or_native")]
    pub slot: Slot,
    #[serde(with = "serde_utils::string_or_native")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: H256,
    pub state_root: H256,
    pub body: BeaconBlockBody,
}

#[derive(Debug, Deserialize)]
pub struct BeaconBlockBody {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Eth1Data,
    pub graffiti: H256,
    pub proposer_slashings: Vec<ProposerSlashing>,
    pub attester_slashings: Vec<AttesterSlashing>,
    pub attestations: Vec<Attestation>,
    pub deposits: Vec<Deposit>,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

impl From<BlockResponse> for Block {
    fn from(response: BlockResponse) -> Self {
        let BlockResponse { root, beacon_block } = response;
        let SignedBeaconBlock { message, signature } = beacon_block;
        let body = message.body;

        Self {
            status: BlockStatus::Proposed,
            slot: message.slot,
            proposer: message.proposer_index,
            block_root: BlockRoot::Observed(root),
            parent_root: message.parent_root,
            state_root: message.state_root,
            signature,
            randao_reveal: body.randao_reveal,
            graffiti: body.graffiti,
            eth1_data: body.eth1_data,
            proposer_slashings: body.proposer_slashings,
            attester_slashings: body.attester_slashings,
            attestations: body.attestations,
            deposits: body.deposits,
            voluntary_exits: body.voluntary_exits,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidatorResponse {
    pub pubkey: PublicKeyBytes,
    #[serde(default, with = "serde_utils::string_or_native::option")]
    pub validator_index: Option<ValidatorIndex>,
    #[serde(default, with = "serde_utils::string_or_native::option")]
    pub balance: Option<Gwei>,
    pub validator: Option<ValidatorRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ValidatorRecord {
    pub withdrawal_credentials: H256,
    #[serde(with = "serde_utils::string_or_native")]
    pub effective_balance: Gwei,
    pub slashed: bool,
    #[serde(with = "serde_utils::string_or_native")]
    pub activation_eligibility_epoch: Epoch,
    #[serde(with = "serde_utils::string_or_native")]
    pub activation_epoch: Epoch,
    #[serde(with = "serde_utils::string_or_native")]
    pub exit_epoch: Epoch,
    #[serde(with = "serde_utils::string_or_native")]
    pub withdrawable_epoch: Epoch,
}

impl ValidatorResponse {
    /// Converts the response into a [`Validator`], or `None` if the node does not know the key.
    pub fn into_validator(self) -> Option<Validator> {
        let Self {
            pubkey,
            validator_index,
            balance,
            validator,
        } = self;

        let record = validator?;

        Some(Validator {
            index: validator_index?,
            public_key: pubkey,
            withdrawal_credentials: record.withdrawal_credentials,
            balance: balance.unwrap_or_default(),
            effective_balance: record.effective_balance,
            slashed: record.slashed,
            activation_eligibility_epoch: record.activation_eligibility_epoch,
            activation_epoch: record.activation_epoch,
            exit_epoch: record.exit_epoch,
            withdrawable_epoch: record.withdrawable_epoch,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GlobalVotes {
    #[serde(with = "serde_utils::string_or_native")]
    pub previous_epoch_active_gwei: Gwei,
    #[serde(with = "serde_utils::string_or_native")]
    pub previous_epoch_target_attesting_gwei: Gwei,
}
