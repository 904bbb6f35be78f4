use strum::{AsRefStr, Display, EnumString};

use crate::primitives::{
    Bloom, ChainId, ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, Gwei,
    UnixSeconds, ValidatorIndex, Wei, H256, H64, U256,
};

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Eth1Block {
    pub hash: ExecutionBlockHash,
    pub parent_hash: ExecutionBlockHash,
    pub uncle_hash: H256,
    pub coinbase: ExecutionAddress,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: ExecutionBlockNumber,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: UnixSeconds,
    pub extra_data: Vec<u8>,
    pub mix_digest: H256,
    pub nonce: H64,
    pub base_fee_per_gas: Option<Wei>,
    pub withdrawals_root: Option<H256>,
    pub blob_gas_used: Option<u64>,
    pub excess_blob_gas: Option<u64>,
    pub uncle_count: usize,
    pub transactions: Vec<Eth1Transaction>,
    pub withdrawals: Vec<Eth1Withdrawal>,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Eth1Transaction {
    // Fields from the block body.
    pub transaction_type: u64,
    pub hash: H256,
    pub chain_id: Option<ChainId>,
    pub nonce: u64,
    pub from: ExecutionAddress,
    pub to: Option<ExecutionAddress>,
    pub value: Wei,
    pub data: Vec<u8>,
    pub gas_limit: u64,
    pub gas_price: Wei,
    pub max_priority_fee_per_gas: Option<Wei>,
    pub max_fee_per_gas: Option<Wei>,
    pub max_fee_per_blob_gas: Option<Wei>,
    pub blob_versioned_hashes: Vec<H256>,

    // Fields from the receipt.
    pub status: TransactionStatus,
    pub contract_address: Option<ExecutionAddress>,
    pub gas_used: u64,
    pub cumulative_gas_used: u64,
    pub blob_gas_used: Option<u64>,
    pub blob_gas_price: Option<Wei>,
    pub logs_bloom: Bloom,
    pub logs: Vec<Eth1Log>,
    pub fee: Wei,

    // Fields from traces.
    pub error_message: Option<String>,
    pub internal_transactions: Vec<Eth1InternalTransaction>,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum TransactionStatus {
    Failed,
    #[default]
    Success,
    /// Receipts from before Byzantium carry a state root instead of a status code.
    Unknown,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Eth1Log {
    pub address: ExecutionAddress,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
    pub log_index: u64,
    pub removed: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Eth1Withdrawal {
    pub index: u64,
    pub validator_index: ValidatorIndex,
    pub address: ExecutionAddress,
    pub amount: Gwei,
}

/// A value transfer or contract interaction nested inside a transaction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Eth1InternalTransaction {
    pub kind: InternalTransactionKind,
    /// Position of the call in the call tree. Empty for the top-level call.
    pub path: Vec<u64>,
    pub from: ExecutionAddress,
    pub to: Option<ExecutionAddress>,
    pub value: Wei,
    pub gas: u64,
    pub gas_used: u64,
    pub error: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InternalTransactionKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
    Create,
    Create2,
    #[strum(serialize = "selfdestruct", serialize = "suicide")]
    SelfDestruct,
}
