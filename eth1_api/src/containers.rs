//! JSON-RPC response bodies.
//!
//! Only the fields used to build [`Eth1Block`]s are declared. Unknown fields are ignored because
//! execution clients disagree on the extras they include.
//!
//! [`Eth1Block`]: types::execution::Eth1Block

use serde::Deserialize;
use types::primitives::{
    Bloom, ChainId, ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, Gwei,
    UnixSeconds, ValidatorIndex, Wei, H256, H64, U256,
};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub hash: ExecutionBlockHash,
    pub parent_hash: ExecutionBlockHash,
    pub sha3_uncles: H256,
    pub miner: ExecutionAddress,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    #[serde(default)]
    pub difficulty: U256,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub number: ExecutionBlockNumber,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_limit: u64,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_used: u64,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    #[serde(with = "serde_utils::prefixed_hex_or_bytes_vec")]
    pub extra_data: Vec<u8>,
    #[serde(default)]
    pub mix_hash: H256,
    #[serde(default)]
    pub nonce: H64,
    pub base_fee_per_gas: Option<Wei>,
    pub withdrawals_root: Option<H256>,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    pub blob_gas_used: Option<u64>,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    pub excess_blob_gas: Option<u64>,
    #[serde(default)]
    pub uncles: Vec<H256>,
    pub transactions: Vec<RpcTransaction>,
    #[serde(default)]
    pub withdrawals: Vec<RpcWithdrawal>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: H256,
    #[serde(rename = "type", default, with = "serde_utils::prefixed_hex_quantity::option")]
    pub transaction_type: Option<u64>,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    pub chain_id: Option<ChainId>,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub nonce: u64,
    pub to: Option<ExecutionAddress>,
    pub value: Wei,
    #[serde(with = "serde_utils::prefixed_hex_or_bytes_vec")]
    pub input: Vec<u8>,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas: u64,
    pub gas_price: Option<Wei>,
    pub max_priority_fee_per_gas: Option<Wei>,
    pub max_fee_per_gas: Option<Wei>,
    pub max_fee_per_blob_gas: Option<Wei>,
    #[serde(default)]
    pub blob_versioned_hashes: Vec<H256>,
    #[serde(default)]
    pub access_list: Vec<AccessListItem>,
    #[serde(default)]
    pub authorization_list: Vec<Authorization>,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl RpcTransaction {
    #[must_use]
    pub fn transaction_type(&self) -> u64 {
        self.transaction_type.unwrap_or_default()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    pub address: ExecutionAddress,
    pub storage_keys: Vec<H256>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub chain_id: U256,
    pub address: ExecutionAddress,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub nonce: u64,
    pub y_parity: U256,
    pub r: U256,
    pub s: U256,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcWithdrawal {
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub index: u64,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub validator_index: ValidatorIndex,
    pub address: ExecutionAddress,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub amount: Gwei,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: H256,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    pub status: Option<u64>,
    pub contract_address: Option<ExecutionAddress>,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_used: u64,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub cumulative_gas_used: u64,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    pub blob_gas_used: Option<u64>,
    pub blob_gas_price: Option<Wei>,
    pub logs_bloom: Bloom,
    pub logs: Vec<RpcLog>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: ExecutionAddress,
    pub topics: Vec<H256>,
    #[serde(with = "serde_utils::prefixed_hex_or_bytes_vec")]
    pub data: Vec<u8>,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}
