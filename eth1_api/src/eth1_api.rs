use core::sync::atomic::{AtomicBool, Ordering};
use std::collections::HashMap;

use anyhow::{bail, ensure, Context as _, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use types::{
    consts::UNKNOWN_SENDER,
    execution::Eth1Block,
    primitives::{ExecutionBlockNumber, H256, U64},
    redacting_url::RedactingUrl,
};
use web3::{transports::Http, Transport as _};

use crate::{
    block_assembly,
    client::Eth1Client,
    config::Config,
    containers::{RpcBlock, RpcReceipt},
    error::Error,
    signer,
    traces::BlockTraces,
};

/// [`Eth1Client`] for a JSON-RPC execution node.
pub struct Eth1Api {
    config: Config,
    client: Client,
    closed: AtomicBool,
}

impl Eth1Api {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(config, client))
    }

    #[must_use]
    pub const fn with_client(config: Config, client: Client) -> Self {
        Self {
            config,
            client,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        ensure!(!self.closed.load(Ordering::Acquire), Error::Closed);
        Ok(())
    }

    fn http(&self) -> Http {
        Http::with_client(self.client.clone(), self.config.url.clone().into_url())
    }

    async fn execute<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let value = self.http().execute(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn spawn_traces(&self, block: &RpcBlock) -> JoinHandle<Result<BlockTraces>> {
        let http = self.http();
        let provider = self.config.trace_provider;
        let params = provider.params(block.number, block.hash);
        let transaction_count = block.transactions.len();

        tokio::spawn(async move {
            if transaction_count == 0 {
                return Ok(BlockTraces::new());
            }

            let response = http.execute(provider.method(), params).await?;
            provider.parse(response, transaction_count)
        })
    }

    fn spawn_receipts(&self, block: &RpcBlock) -> JoinHandle<Result<Vec<RpcReceipt>>> {
        let client = self.client.clone();
        let url = self.config.url.clone();

        let hashes = block
            .transactions
            .iter()
            .map(|transaction| transaction.hash)
            .collect();

        tokio::spawn(fetch_receipts(client, url, hashes))
    }
}

#[async_trait]
impl Eth1Client for Eth1Api {
    async fn get_block(&self, number: ExecutionBlockNumber) -> Result<Eth1Block> {
        self.ensure_open()?;

        let params = vec![json!(format!("{number:#x}")), json!(true)];

        let Some(block) = self
            .execute::<Option<RpcBlock>>("eth_getBlockByNumber", params)
            .await
            .with_context(|| format!("failed to fetch block {number}"))?
        else {
            bail!(Error::BlockNotFound { number });
        };

        debug!(
            "assembling block {number} with {} transactions",
            block.transactions.len(),
        );

        // Both tasks run to completion even if the other one fails.
        let traces = self.spawn_traces(&block);
        let receipts = self.spawn_receipts(&block);

        let senders = block
            .transactions
            .iter()
            .map(|transaction| {
                signer::recover_sender(transaction, self.config.chain_id).unwrap_or_else(|error| {
                    warn!(
                        "failed to recover sender of transaction {:?} in block {number}: {error}",
                        transaction.hash,
                    );

                    UNKNOWN_SENDER
                })
            })
            .collect();

        let (receipts, traces) = tokio::try_join!(join(receipts), join(traces))
            .with_context(|| format!("failed to fetch receipts and traces of block {number}"))?;

        block_assembly::assemble(block, senders, receipts, traces)
            .with_context(|| format!("failed to assemble block {number}"))
    }

    async fn get_latest_eth1_block_number(&self) -> Result<ExecutionBlockNumber> {
        self.ensure_open()?;

        Ok(self
            .execute::<U64>("eth_blockNumber", vec![])
            .await
            .context("failed to fetch latest block number")?
            .as_u64())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

async fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await?
}

#[derive(Deserialize)]
struct BatchOutput {
    id: usize,
    #[serde(default)]
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Fetches receipts of all `hashes` in a single batch request.
///
/// A failed or `null` receipt fails the whole batch.
async fn fetch_receipts(
    client: Client,
    url: RedactingUrl,
    hashes: Vec<H256>,
) -> Result<Vec<RpcReceipt>> {
    if hashes.is_empty() {
        return Ok(vec![]);
    }

    let requests = hashes
        .iter()
        .enumerate()
        .map(|(id, hash)| {
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "eth_getTransactionReceipt",
                "params": [hash],
            })
        })
        .collect::<Vec<_>>();

    let mut outputs = client
        .post(url.into_url())
        .json(&requests)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<BatchOutput>>()
        .await?
        .into_iter()
        .map(|output| (output.id, output))
        .collect::<HashMap<_, _>>();

    hashes
        .into_iter()
        .enumerate()
        .map(|(id, hash)| {
            let Some(output) = outputs.remove(&id) else {
                bail!(Error::MissingBatchResponse { id });
            };

            if let Some(RpcError { code, message }) = output.error {
                bail!(Error::ReceiptRequestFailed {
                    hash,
                    message: format!("{message} (code {code})"),
                });
            }

            match output.result {
                Some(Value::Null) | None => bail!(Error::MissingReceipt { hash }),
                Some(receipt) => Ok(serde_json::from_value(receipt)?),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use httpmock::{Method, MockServer};
    use types::{
        execution::{InternalTransactionKind, TransactionStatus},
        primitives::{Bloom, ExecutionAddress, Wei, H160},
    };

    use crate::config::TraceProvider;

    use super::*;

    const SENDER: ExecutionAddress = H160(hex!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"));
    const RECIPIENT: ExecutionAddress = H160(hex!("3535353535353535353535353535353535353535"));

    fn eth1_api(server: &MockServer) -> Result<Eth1Api> {
        Eth1Api::new(Config::new(server.url("/").parse()?, TraceProvider::Parity))
    }

    fn response(result: Value) -> Value {
        json!({ "jsonrpc": "2.0", "id": 1, "result": result })
    }

    fn batch_output(id: usize, result: Value) -> Value {
        json!({ "jsonrpc": "2.0", "id": id, "result": result })
    }

    fn block() -> Value {
        json!({
            "hash": H256::repeat_byte(0xbb),
            "parentHash": H256::repeat_byte(0xaa),
            "sha3Uncles": H256::zero(),
            "miner": RECIPIENT,
            "stateRoot": H256::zero(),
            "transactionsRoot": H256::zero(),
            "receiptsRoot": H256::zero(),
            "logsBloom": Bloom::zero(),
            "difficulty": "0x0",
            "number": "0x1d243",
            "gasLimit": "0x1c9c380",
            "gasUsed": "0xe8c8",
            "timestamp": "0x65f1b000",
            "extraData": "0x",
            "mixHash": H256::zero(),
            "nonce": "0x0000000000000000",
            "baseFeePerGas": "0x2540be400",
            "withdrawalsRoot": H256::zero(),
            "uncles": [],
            "transactions": [
                {
                    "hash": H256::repeat_byte(1),
                    "type": "0x0",
                    "nonce": "0x9",
                    "gasPrice": "0x4a817c800",
                    "gas": "0x5208",
                    "to": RECIPIENT,
                    "value": "0xde0b6b3a7640000",
                    "input": "0x",
                    "v": "0x25",
                    "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                    "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
                },
                {
                    "hash": H256::repeat_byte(2),
                    "type": "0x2",
                    "chainId": "0x1",
                    "nonce": "0x3",
                    "gasPrice": "0x2cb417800",
                    "maxPriorityFeePerGas": "0x77359400",
                    "maxFeePerGas": "0x6fc23ac00",
                    "gas": "0xc350",
                    "to": RECIPIENT,
                    "value": "0x3039",
                    "input": "0xa9059cbb",
                    "accessList": [],
                    // Signature over a different payload. The sender cannot be recovered.
                    "v": "0x1",
                    "r": "0x97d02aa1967c5783537208ff5edaa312e41b23139e326d6b6542d52322bbf99",
                    "s": "0x5fcbb02aaec94714c33b19355ad6ef95998d38a7e8434aa8311edc2dd0917e98",
                },
            ],
            "withdrawals": [
                {
                    "index": "0x10",
                    "validatorIndex": "0x5",
                    "address": RECIPIENT,
                    "amount": "0x3b9aca00",
                },
            ],
        })
    }

    fn receipt(transaction_hash: H256, status: &str, gas_used: &str) -> Value {
        json!({
            "transactionHash": transaction_hash,
            "status": status,
            "contractAddress": null,
            "gasUsed": gas_used,
            "cumulativeGasUsed": gas_used,
            "logsBloom": Bloom::zero(),
            "logs": [
                {
                    "address": RECIPIENT,
                    "topics": [H256::repeat_byte(0x77)],
                    "data": "0x01",
                    "logIndex": "0x0",
                    "removed": false,
                },
            ],
        })
    }

    fn traces() -> Value {
        json!([
            {
                "type": "call",
                "action": {
                    "callType": "call",
                    "from": SENDER,
                    "to": RECIPIENT,
                    "value": "0x0",
                    "gas": "0x0",
                },
                "result": { "gasUsed": "0x0" },
                "traceAddress": [],
                "transactionHash": H256::repeat_byte(1),
                "transactionPosition": 0,
            },
            {
                "type": "call",
                "action": {
                    "callType": "call",
                    "from": SENDER,
                    "to": RECIPIENT,
                    "value": "0x0",
                    "gas": "0x0",
                },
                "error": "Reverted",
                "traceAddress": [],
                "transactionHash": H256::repeat_byte(2),
                "transactionPosition": 1,
            },
            {
                "type": "call",
                "action": {
                    "callType": "staticcall",
                    "from": RECIPIENT,
                    "to": SENDER,
                    "value": "0x0",
                    "gas": "0x100",
                },
                "result": { "gasUsed": "0x10" },
                "traceAddress": [0],
                "transactionHash": H256::repeat_byte(2),
                "transactionPosition": 1,
            },
        ])
    }

    fn mock_block_and_traces(server: &MockServer) {
        server.mock(|when, then| {
            when.method(Method::POST)
                .path("/")
                .body_contains("eth_getBlockByNumber");
            then.status(200).json_body(response(block()));
        });

        server.mock(|when, then| {
            when.method(Method::POST).path("/").body_contains("trace_block");
            then.status(200).json_body(response(traces()));
        });
    }

    #[tokio::test]
    async fn block_is_assembled_from_receipts_and_traces() -> Result<()> {
        let server = MockServer::start();

        mock_block_and_traces(&server);

        server.mock(|when, then| {
            when.method(Method::POST)
                .path("/")
                .body_contains("eth_getTransactionReceipt");
            then.status(200).json_body(json!([
                batch_output(1, receipt(H256::repeat_byte(2), "0x0", "0x9c40")),
                batch_output(0, receipt(H256::repeat_byte(1), "0x1", "0x5208")),
            ]));
        });

        let block = eth1_api(&server)?.get_block(0x1d243).await?;

        assert_eq!(block.number, 0x1d243);
        assert_eq!(block.hash, H256::repeat_byte(0xbb));
        assert_eq!(block.base_fee_per_gas, Some(Wei::from(10_000_000_000_u64)));
        assert_eq!(block.withdrawals.len(), 1);
        assert_eq!(block.withdrawals[0].amount, 1_000_000_000);
        assert_eq!(block.transactions.len(), 2);

        let legacy = &block.transactions[0];

        assert_eq!(legacy.from, SENDER);
        assert_eq!(legacy.status, TransactionStatus::Success);
        assert_eq!(legacy.fee, Wei::from(420_000_000_000_000_u64));
        assert_eq!(legacy.logs[0].topics, [H256::repeat_byte(0x77)]);
        assert_eq!(legacy.error_message, None);
        assert!(legacy.internal_transactions.is_empty());

        let dynamic_fee = &block.transactions[1];

        assert_ne!(dynamic_fee.from, SENDER);
        assert_eq!(dynamic_fee.status, TransactionStatus::Failed);
        assert_eq!(dynamic_fee.error_message.as_deref(), Some("Reverted"));
        assert_eq!(dynamic_fee.fee, Wei::from(480_000_000_000_000_u64));
        assert_eq!(
            dynamic_fee.internal_transactions[0].kind,
            InternalTransactionKind::StaticCall,
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_receipt_fails_the_whole_block() -> Result<()> {
        let server = MockServer::start();

        mock_block_and_traces(&server);

        server.mock(|when, then| {
            when.method(Method::POST)
                .path("/")
                .body_contains("eth_getTransactionReceipt");
            then.status(200).json_body(json!([
                batch_output(0, receipt(H256::repeat_byte(1), "0x1", "0x5208")),
                batch_output(1, Value::Null),
            ]));
        });

        let error = eth1_api(&server)?
            .get_block(0x1d243)
            .await
            .expect_err("block without all receipts should be rejected")
            .downcast::<Error>()?;

        assert_eq!(
            error,
            Error::MissingReceipt {
                hash: H256::repeat_byte(2),
            },
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_receipt_request_fails_the_whole_block() -> Result<()> {
        let server = MockServer::start();

        mock_block_and_traces(&server);

        server.mock(|when, then| {
            when.method(Method::POST)
                .path("/")
                .body_contains("eth_getTransactionReceipt");
            then.status(200).json_body(json!([
                {
                    "jsonrpc": "2.0",
                    "id": 0,
                    "error": { "code": -32000, "message": "pruned" },
                },
                batch_output(1, receipt(H256::repeat_byte(2), "0x1", "0x9c40")),
            ]));
        });

        let error = eth1_api(&server)?
            .get_block(0x1d243)
            .await
            .expect_err("receipt errors should fail the block")
            .downcast::<Error>()?;

        assert_eq!(
            error,
            Error::ReceiptRequestFailed {
                hash: H256::repeat_byte(1),
                message: "pruned (code -32000)".to_owned(),
            },
        );

        Ok(())
    }

    #[tokio::test]
    async fn receipt_batch_errors_name_the_block() -> Result<()> {
        let server = MockServer::start();

        mock_block_and_traces(&server);

        server.mock(|when, then| {
            when.method(Method::POST)
                .path("/")
                .body_contains("eth_getTransactionReceipt");
            then.status(500).body("upstream unavailable");
        });

        let error = eth1_api(&server)?
            .get_block(0x1d243)
            .await
            .expect_err("failed receipt batch should fail the block");

        assert!(format!("{error:#}").contains("block 119363"));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_block_is_an_error() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::POST).path("/");
            then.status(200).json_body(response(Value::Null));
        });

        let error = eth1_api(&server)?
            .get_block(100)
            .await
            .expect_err("null block should be an error")
            .downcast::<Error>()?;

        assert_eq!(error, Error::BlockNotFound { number: 100 });

        Ok(())
    }

    #[tokio::test]
    async fn latest_block_number_is_decoded() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::POST).path("/").body_contains("eth_blockNumber");
            then.status(200).json_body(response(json!("0x1d243")));
        });

        assert_eq!(eth1_api(&server)?.get_latest_eth1_block_number().await?, 119_363);

        Ok(())
    }

    #[tokio::test]
    async fn closed_client_makes_no_requests() -> Result<()> {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(Method::POST).path("/");
            then.status(200).json_body(response(json!("0x1")));
        });

        let eth1_api = eth1_api(&server)?;

        eth1_api.close();

        let error = eth1_api
            .get_latest_eth1_block_number()
            .await
            .expect_err("closed client should refuse requests")
            .downcast::<Error>()?;

        assert_eq!(error, Error::Closed);
        mock.assert_hits_async(0).await;

        Ok(())
    }
}
