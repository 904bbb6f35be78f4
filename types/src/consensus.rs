use std::{collections::BTreeMap, sync::Arc};

use serde::Deserialize;
use serde_repr::Serialize_repr;

use crate::{
    assignments::EpochAssignments,
    consts::{MISSED_BLOCK_ROOT, SCHEDULED_BLOCK_ROOT},
    primitives::{
        CommitteeIndex, Epoch, Gwei, PublicKeyBytes, SignatureBytes, Slot, ValidatorIndex, H256,
    },
};

/// Every block of an epoch, including placeholders, grouped by slot and then by root.
pub type EpochBlocks = BTreeMap<Slot, BTreeMap<BlockRoot, Block>>;

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ChainHead {
    pub head_slot: Slot,
    pub head_epoch: Epoch,
    pub head_block_root: H256,
    pub finalized_slot: Slot,
    pub finalized_epoch: Epoch,
    pub finalized_block_root: H256,
    pub justified_slot: Slot,
    pub justified_epoch: Epoch,
    pub justified_block_root: H256,
    pub previous_justified_slot: Slot,
    pub previous_justified_epoch: Epoch,
    pub previous_justified_block_root: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Serialize_repr)]
#[repr(u8)]
pub enum BlockStatus {
    #[default]
    Scheduled = 0,
    Proposed = 1,
    Missed = 2,
    Orphaned = 3,
}

impl BlockStatus {
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        matches!(self, Self::Scheduled | Self::Missed)
    }
}

/// Root of a block as seen by consumers.
///
/// Placeholders get 1 byte roots so that they can never collide with real 32 byte roots.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub enum BlockRoot {
    #[default]
    Scheduled,
    Missed,
    Observed(H256),
}

impl From<H256> for BlockRoot {
    fn from(root: H256) -> Self {
        Self::Observed(root)
    }
}

impl BlockRoot {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Scheduled => SCHEDULED_BLOCK_ROOT,
            Self::Missed => MISSED_BLOCK_ROOT,
            Self::Observed(root) => root.as_bytes(),
        }
    }

    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        !matches!(self, Self::Observed(_))
    }
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Block {
    pub status: BlockStatus,
    pub slot: Slot,
    pub proposer: ValidatorIndex,
    pub block_root: BlockRoot,
    pub parent_root: H256,
    pub state_root: H256,
    pub signature: SignatureBytes,
    pub randao_reveal: SignatureBytes,
    pub graffiti: H256,
    pub eth1_data: Eth1Data,
    pub proposer_slashings: Vec<ProposerSlashing>,
    pub attester_slashings: Vec<AttesterSlashing>,
    pub attestations: Vec<Attestation>,
    pub deposits: Vec<Deposit>,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

impl Block {
    /// Creates a block for a slot that has a proposer but no observed block.
    ///
    /// `status` must be either [`BlockStatus::Scheduled`] or [`BlockStatus::Missed`].
    #[must_use]
    pub fn placeholder(slot: Slot, proposer: ValidatorIndex, status: BlockStatus) -> Self {
        let block_root = match status {
            BlockStatus::Missed => BlockRoot::Missed,
            _ => BlockRoot::Scheduled,
        };

        Self {
            status,
            slot,
            proposer,
            block_root,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checkpoint {
    #[serde(with = "serde_utils::string_or_native")]
    pub epoch: Epoch,
    pub root: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttestationData {
    #[serde(with = "serde_utils::string_or_native")]
    pub slot: Slot,
    #[serde(with = "serde_utils::string_or_native")]
    pub index: CommitteeIndex,
    pub beacon_block_root: H256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize)]
pub struct Attestation {
    #[serde(with = "serde_utils::prefixed_hex_or_bytes_vec")]
    pub aggregation_bits: Vec<u8>,
    /// Filled in after decoding `aggregation_bits` against the committee assignments.
    #[serde(skip)]
    pub attesters: Vec<ValidatorIndex>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Eth1Data {
    pub deposit_root: H256,
    #[serde(with = "serde_utils::string_or_native")]
    pub deposit_count: u64,
    pub block_hash: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeaconBlockHeader {
    #[serde(with = "serde_utils::string_or_native")]
    pub slot: Slot,
    #[serde(with = "serde_utils::string_or_native")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: H256,
    pub state_root: H256,
    pub body_root: H256,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    pub signature: SignatureBytes,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProposerSlashing {
    pub signed_header_1: SignedBeaconBlockHeader,
    pub signed_header_2: SignedBeaconBlockHeader,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexedAttestation {
    pub attesting_indices: Vec<ValidatorIndex>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepositData {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: H256,
    #[serde(with = "serde_utils::string_or_native")]
    pub amount: Gwei,
    pub signature: SignatureBytes,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Deposit {
    pub proof: Vec<H256>,
    pub data: DepositData,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoluntaryExit {
    #[serde(with = "serde_utils::string_or_native")]
    pub epoch: Epoch,
    #[serde(with = "serde_utils::string_or_native")]
    pub validator_index: ValidatorIndex,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedVoluntaryExit {
    pub message: VoluntaryExit,
    pub signature: SignatureBytes,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Validator {
    pub index: ValidatorIndex,
    pub public_key: PublicKeyBytes,
    pub withdrawal_credentials: H256,
    pub balance: Gwei,
    pub effective_balance: Gwei,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct ValidatorQueue {
    pub churn_limit: u64,
    pub activation_public_keys: Vec<PublicKeyBytes>,
    pub exit_public_keys: Vec<PublicKeyBytes>,
    pub activation_validator_indices: Vec<ValidatorIndex>,
    pub exit_validator_indices: Vec<ValidatorIndex>,
}

#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct ValidatorParticipation {
    pub epoch: Epoch,
    pub finalized: bool,
    pub global_participation_rate: f32,
    pub voted_ether: Gwei,
    pub eligible_ether: Gwei,
}

impl ValidatorParticipation {
    /// Participation figures to report when the node could not provide any.
    #[must_use]
    pub fn unavailable(epoch: Epoch) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct EpochData {
    pub epoch: Epoch,
    pub validators: Vec<Validator>,
    pub validator_assignments: Arc<EpochAssignments>,
    pub blocks: EpochBlocks,
    pub epoch_participation_stats: ValidatorParticipation,
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use serde_json::json;

    use super::*;

    #[test]
    fn placeholder_roots_match_status() {
        let scheduled = Block::placeholder(65, 3, BlockStatus::Scheduled);
        let missed = Block::placeholder(66, 4, BlockStatus::Missed);

        assert_eq!(scheduled.block_root.as_bytes(), [0x00]);
        assert_eq!(missed.block_root.as_bytes(), [0x01]);
        assert!(scheduled.block_root.is_synthetic());
        assert!(missed.status.is_synthetic());
    }

    #[test]
    fn observed_roots_are_32_bytes() {
        let root = BlockRoot::from(H256::repeat_byte(0x11));

        assert_eq!(root.as_bytes().len(), 32);
        assert!(!root.is_synthetic());
    }

    #[test]
    fn placeholders_sort_before_observed_roots() {
        let mut roots = [
            BlockRoot::Observed(H256::zero()),
            BlockRoot::Missed,
            BlockRoot::Scheduled,
        ];

        roots.sort();

        assert_eq!(
            roots,
            [BlockRoot::Scheduled, BlockRoot::Missed, BlockRoot::Observed(H256::zero())],
        );
    }

    #[test]
    fn block_status_serializes_as_number() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_value(BlockStatus::Missed)?, json!(2));
        Ok(())
    }

    #[test]
    fn attestation_deserializes_without_attesters() -> serde_json::Result<()> {
        let root = format!("0x{}", "22".repeat(32));
        let signature = format!("0x{}", "00".repeat(96));

        let attestation = serde_json::from_value::<Attestation>(json!({
            "aggregation_bits": "0x0d",
            "data": {
                "slot": "70",
                "index": 1,
                "beacon_block_root": root,
                "source": { "epoch": 1, "root": root },
                "target": { "epoch": "2", "root": root },
            },
            "signature": signature,
        }))?;

        assert_eq!(attestation.aggregation_bits, hex!("0d"));
        assert_eq!(attestation.data.slot, 70);
        assert_eq!(attestation.data.target.epoch, 2);
        assert!(attestation.attesters.is_empty());

        Ok(())
    }
}
