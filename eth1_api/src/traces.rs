//! Internal transactions from the two common tracing APIs.
//!
//! Parity style `trace_block` returns a flat list of calls tagged with their position in the
//! call tree. Geth style `debug_traceBlockByHash` with `callTracer` returns one nested call
//! frame per transaction. Both are normalized into [`TransactionTrace`]s.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};
use types::{
    execution::{Eth1InternalTransaction, InternalTransactionKind},
    primitives::{ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, H256, U256},
};

use crate::{config::TraceProvider, error::Error};

/// Trace of a single transaction.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct TransactionTrace {
    /// Error that made the top-level call fail.
    pub error: Option<String>,
    /// Calls made by the transaction, excluding the top-level call.
    pub internal_transactions: Vec<Eth1InternalTransaction>,
}

/// Traces keyed by position of the transaction in the block.
pub type BlockTraces = BTreeMap<usize, TransactionTrace>;

impl TraceProvider {
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Parity => "trace_block",
            Self::Geth => "debug_traceBlockByHash",
        }
    }

    #[must_use]
    pub fn params(self, number: ExecutionBlockNumber, hash: ExecutionBlockHash) -> Vec<Value> {
        match self {
            Self::Parity => vec![json!(format!("{number:#x}"))],
            Self::Geth => vec![json!(hash), json!({ "tracer": "callTracer" })],
        }
    }

    /// Normalizes a response to the request built by [`Self::params`].
    pub fn parse(self, response: Value, transaction_count: usize) -> Result<BlockTraces> {
        let traces = match self {
            Self::Parity => parity_traces(serde_json::from_value(response)?)?,
            Self::Geth => geth_traces(serde_json::from_value(response)?)?,
        };

        let out_of_range = traces
            .keys()
            .copied()
            .find(|position| *position >= transaction_count);

        if let Some(position) = out_of_range {
            bail!(Error::TracePositionOutOfRange {
                position,
                count: transaction_count,
            });
        }

        Ok(traces)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParityTrace {
    #[serde(rename = "type")]
    trace_type: String,
    action: ParityAction,
    error: Option<String>,
    #[serde(default)]
    trace_address: Vec<u64>,
    transaction_hash: Option<H256>,
    transaction_position: Option<usize>,
    result: Option<ParityResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParityAction {
    call_type: Option<String>,
    creation_method: Option<String>,
    from: Option<ExecutionAddress>,
    to: Option<ExecutionAddress>,
    value: Option<U256>,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    gas: Option<u64>,
    // Self-destructs name their fields differently.
    address: Option<ExecutionAddress>,
    refund_address: Option<ExecutionAddress>,
    balance: Option<U256>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParityResult {
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    gas_used: Option<u64>,
    // Set for contract creations.
    address: Option<ExecutionAddress>,
}

fn parity_traces(traces: Vec<ParityTrace>) -> Result<BlockTraces> {
    let mut block_traces = BlockTraces::new();

    for trace in traces {
        // Block and uncle rewards are not part of any transaction.
        let (Some(_), Some(position)) = (trace.transaction_hash, trace.transaction_position)
        else {
            debug!("skipping {} trace without transaction", trace.trace_type);
            continue;
        };

        let transaction_trace = block_traces.entry(position).or_default();

        if trace.trace_address.is_empty() {
            transaction_trace.error = trace.error.filter(|error| !error.is_empty());
            continue;
        }

        let ParityTrace {
            trace_type,
            action,
            error,
            trace_address,
            result,
            ..
        } = trace;

        let kind_name = match trace_type.as_str() {
            "call" => action.call_type.as_deref().unwrap_or("call"),
            "create" => action.creation_method.as_deref().unwrap_or("create"),
            other => other,
        };

        let Ok(kind) = kind_name.parse() else {
            debug!("skipping trace of unknown type {kind_name}");
            continue;
        };

        let internal_transaction = if kind == InternalTransactionKind::SelfDestruct {
            Eth1InternalTransaction {
                kind,
                path: trace_address,
                from: action.address.unwrap_or_default(),
                to: action.refund_address,
                value: action.balance.unwrap_or_default(),
                gas: 0,
                gas_used: 0,
                error,
            }
        } else {
            let created = result.as_ref().and_then(|result| result.address);

            Eth1InternalTransaction {
                kind,
                path: trace_address,
                from: action.from.unwrap_or_default(),
                to: action.to.or(created),
                value: action.value.unwrap_or_default(),
                gas: action.gas.unwrap_or_default(),
                gas_used: result
                    .and_then(|result| result.gas_used)
                    .unwrap_or_default(),
                error,
            }
        };

        transaction_trace
            .internal_transactions
            .push(internal_transaction);
    }

    Ok(block_traces)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GethTrace {
    result: Option<CallFrame>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallFrame {
    #[serde(rename = "type")]
    frame_type: String,
    from: ExecutionAddress,
    to: Option<ExecutionAddress>,
    value: Option<U256>,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    gas: Option<u64>,
    #[serde(default, with = "serde_utils::prefixed_hex_quantity::option")]
    gas_used: Option<u64>,
    error: Option<String>,
    #[serde(default)]
    calls: Vec<CallFrame>,
}

fn geth_traces(traces: Vec<GethTrace>) -> Result<BlockTraces> {
    let mut block_traces = BlockTraces::new();

    for (position, trace) in traces.into_iter().enumerate() {
        let Some(root) = trace.result else {
            return Err(Error::TraceFailed {
                position,
                message: trace.error.unwrap_or_default(),
            }
            .into());
        };

        let mut transaction_trace = TransactionTrace {
            error: root.error.filter(|error| !error.is_empty()),
            internal_transactions: vec![],
        };

        for (index, call) in (0..).zip(root.calls) {
            flatten_call_frame(call, vec![index], &mut transaction_trace.internal_transactions);
        }

        block_traces.insert(position, transaction_trace);
    }

    Ok(block_traces)
}

fn flatten_call_frame(
    frame: CallFrame,
    path: Vec<u64>,
    output: &mut Vec<Eth1InternalTransaction>,
) {
    let CallFrame {
        frame_type,
        from,
        to,
        value,
        gas,
        gas_used,
        error,
        calls,
    } = frame;

    match frame_type.parse() {
        Ok(kind) => output.push(Eth1InternalTransaction {
            kind,
            path: path.clone(),
            from,
            to,
            value: value.unwrap_or_default(),
            gas: gas.unwrap_or_default(),
            gas_used: gas_used.unwrap_or_default(),
            error,
        }),
        Err(_) => debug!("skipping call frame of unknown type {frame_type}"),
    }

    for (index, call) in (0..).zip(calls) {
        let mut child_path = path.clone();
        child_path.push(index);
        flatten_call_frame(call, child_path, output);
    }
}
