use thiserror::Error;
use types::primitives::{ExecutionBlockNumber, H256, U256};

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Error {
    #[error("execution node has no block {number}")]
    BlockNotFound { number: ExecutionBlockNumber },
    #[error("Eth1 client has been closed")]
    Closed,
    #[error("signature of transaction {hash:?} has invalid v value {v}")]
    InvalidV { hash: H256, v: U256 },
    #[error("batch response is missing an answer to request {id}")]
    MissingBatchResponse { id: usize },
    #[error("execution node returned no receipt for transaction {hash:?}")]
    MissingReceipt { hash: H256 },
    #[error("receipt at position {position} is for {received:?} instead of {expected:?}")]
    ReceiptMismatch {
        position: usize,
        expected: H256,
        received: H256,
    },
    #[error("failed to fetch receipt for transaction {hash:?}: {message}")]
    ReceiptRequestFailed { hash: H256, message: String },
    #[error("tracer failed for transaction at position {position}: {message}")]
    TraceFailed { position: usize, message: String },
    #[error("trace refers to transaction at position {position} but block has {count}")]
    TracePositionOutOfRange { position: usize, count: usize },
    #[error("transaction type {transaction_type} is not supported for sender recovery")]
    UnsupportedTransactionType { transaction_type: u64 },
}
