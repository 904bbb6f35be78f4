//! Combines a block, its receipts and its traces into an [`Eth1Block`].

use anyhow::{ensure, Result};
use helper_functions::fee::{self, GasPricing};
use types::{
    execution::{Eth1Block, Eth1Log, Eth1Transaction, Eth1Withdrawal, TransactionStatus},
    primitives::{ExecutionAddress, Wei},
};

use crate::{
    containers::{RpcBlock, RpcReceipt, RpcTransaction},
    error::Error,
    traces::BlockTraces,
};

/// Assembles an [`Eth1Block`].
///
/// `senders` and `receipts` must be in the same order as `block.transactions`.
/// A receipt for a different transaction fails the whole block.
pub fn assemble(
    block: RpcBlock,
    senders: Vec<ExecutionAddress>,
    receipts: Vec<RpcReceipt>,
    mut traces: BlockTraces,
) -> Result<Eth1Block> {
    let RpcBlock {
        hash,
        parent_hash,
        sha3_uncles,
        miner,
        state_root,
        transactions_root,
        receipts_root,
        logs_bloom,
        difficulty,
        number,
        gas_limit,
        gas_used,
        timestamp,
        extra_data,
        mix_hash,
        nonce,
        base_fee_per_gas,
        withdrawals_root,
        blob_gas_used,
        excess_blob_gas,
        uncles,
        transactions,
        withdrawals,
    } = block;

    let transactions = transactions
        .into_iter()
        .zip(senders)
        .zip(receipts)
        .enumerate()
        .map(|(position, ((transaction, from), receipt))| -> Result<Eth1Transaction> {
            ensure!(
                receipt.transaction_hash == transaction.hash,
                Error::ReceiptMismatch {
                    position,
                    expected: transaction.hash,
                    received: receipt.transaction_hash,
                },
            );

            let mut eth1_transaction = merge(transaction, from, receipt, base_fee_per_gas);

            if let Some(trace) = traces.remove(&position) {
                let error = trace.error.filter(|error| !error.is_empty());

                if error.is_some() {
                    eth1_transaction.status = TransactionStatus::Failed;
                }

                eth1_transaction.error_message = error;
                eth1_transaction.internal_transactions = trace.internal_transactions;
            }

            Ok(eth1_transaction)
        })
        .collect::<Result<_>>()?;

    let withdrawals = withdrawals
        .into_iter()
        .map(|withdrawal| Eth1Withdrawal {
            index: withdrawal.index,
            validator_index: withdrawal.validator_index,
            address: withdrawal.address,
            amount: withdrawal.amount,
        })
        .collect();

    Ok(Eth1Block {
        hash,
        parent_hash,
        uncle_hash: sha3_uncles,
        coinbase: miner,
        state_root,
        transactions_root,
        receipts_root,
        logs_bloom,
        difficulty,
        number,
        gas_limit,
        gas_used,
        timestamp,
        extra_data,
        mix_digest: mix_hash,
        nonce,
        base_fee_per_gas,
        withdrawals_root,
        blob_gas_used,
        excess_blob_gas,
        uncle_count: uncles.len(),
        transactions,
        withdrawals,
    })
}

fn merge(
    transaction: RpcTransaction,
    from: ExecutionAddress,
    receipt: RpcReceipt,
    base_fee_per_gas: Option<Wei>,
) -> Eth1Transaction {
    let transaction_type = transaction.transaction_type();
    let gas_price = transaction.gas_price.unwrap_or_default();

    let pricing = GasPricing {
        transaction_type,
        gas_price,
        max_priority_fee_per_gas: transaction.max_priority_fee_per_gas,
        max_fee_per_gas: transaction.max_fee_per_gas,
    };

    let status = match receipt.status {
        Some(0) => TransactionStatus::Failed,
        Some(_) => TransactionStatus::Success,
        None => TransactionStatus::Unknown,
    };

    let logs = receipt
        .logs
        .into_iter()
        .map(|log| Eth1Log {
            address: log.address,
            topics: log.topics,
            data: log.data,
            log_index: log.log_index.unwrap_or_default(),
            removed: log.removed,
        })
        .collect();

    Eth1Transaction {
        transaction_type,
        hash: transaction.hash,
        chain_id: transaction.chain_id,
        nonce: transaction.nonce,
        from,
        to: transaction.to,
        value: transaction.value,
        data: transaction.input,
        gas_limit: transaction.gas,
        gas_price,
        max_priority_fee_per_gas: transaction.max_priority_fee_per_gas,
        max_fee_per_gas: transaction.max_fee_per_gas,
        max_fee_per_blob_gas: transaction.max_fee_per_blob_gas,
        blob_versioned_hashes: transaction.blob_versioned_hashes,
        status,
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
        cumulative_gas_used: receipt.cumulative_gas_used,
        blob_gas_used: receipt.blob_gas_used,
        blob_gas_price: receipt.blob_gas_price,
        logs_bloom: receipt.logs_bloom,
        logs,
        fee: fee::transaction_fee(pricing, base_fee_per_gas, receipt.gas_used),
        error_message: None,
        internal_transactions: vec![],
    }
}
