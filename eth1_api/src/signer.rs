//! Sender recovery for every transaction type accepted since the London fork, plus blob and
//! set-code transactions.
//!
//! The signing payload is rebuilt from the JSON-RPC representation, hashed and passed to
//! `ecrecover` together with the signature.

use alloy_rlp::{Encodable, Header};
use anyhow::{bail, ensure, Result};
use types::primitives::{ChainId, ExecutionAddress, H256, U256};
use web3::signing;

use crate::{
    containers::{AccessListItem, Authorization, RpcTransaction},
    error::Error,
};

const LEGACY_TRANSACTION_TYPE: u64 = 0;
const ACCESS_LIST_TRANSACTION_TYPE: u64 = 1;
const DYNAMIC_FEE_TRANSACTION_TYPE: u64 = 2;
const BLOB_TRANSACTION_TYPE: u64 = 3;
const SET_CODE_TRANSACTION_TYPE: u64 = 4;

// `v` of legacy transactions signed without replay protection.
const HOMESTEAD_V_OFFSET: u64 = 27;
// `v` of legacy transactions signed as specified in EIP-155 is `chain_id * 2 + 35 + parity`.
const EIP155_V_OFFSET: u64 = 35;

/// Recovers the address that signed `transaction`.
///
/// `fallback_chain_id` is used for typed transactions that do not report their chain ID.
pub fn recover_sender(
    transaction: &RpcTransaction,
    fallback_chain_id: ChainId,
) -> Result<ExecutionAddress> {
    let (message_hash, recovery_id) = signing_hash(transaction, fallback_chain_id)?;

    let mut signature = [0; 64];
    transaction.r.to_big_endian(&mut signature[..32]);
    transaction.s.to_big_endian(&mut signature[32..]);

    let sender = signing::recover(message_hash.as_bytes(), &signature, recovery_id)?;

    Ok(sender)
}

/// Hash of the payload signed by the sender and the recovery ID of the signature.
fn signing_hash(transaction: &RpcTransaction, fallback_chain_id: ChainId) -> Result<(H256, i32)> {
    let transaction_type = transaction.transaction_type();

    if transaction_type == LEGACY_TRANSACTION_TYPE {
        return legacy_signing_hash(transaction);
    }

    ensure!(
        transaction.v <= U256::one(),
        Error::InvalidV {
            hash: transaction.hash,
            v: transaction.v,
        },
    );

    let recovery_id = i32::from(transaction.v == U256::one());
    let chain_id = transaction.chain_id.unwrap_or(fallback_chain_id);

    let mut fields = RlpList::default();
    fields.append(&chain_id).append(&transaction.nonce);

    match transaction_type {
        ACCESS_LIST_TRANSACTION_TYPE => {
            fields.append_u256(transaction.gas_price.unwrap_or_default());
        }
        DYNAMIC_FEE_TRANSACTION_TYPE | BLOB_TRANSACTION_TYPE | SET_CODE_TRANSACTION_TYPE => {
            fields
                .append_u256(transaction.max_priority_fee_per_gas.unwrap_or_default())
                .append_u256(transaction.max_fee_per_gas.unwrap_or_default());
        }
        _ => bail!(Error::UnsupportedTransactionType { transaction_type }),
    }

    fields
        .append(&transaction.gas)
        .append_address(transaction.to)
        .append_u256(transaction.value)
        .append(transaction.input.as_slice())
        .append_list(&access_list(&transaction.access_list));

    if transaction_type == BLOB_TRANSACTION_TYPE {
        let mut hashes = RlpList::default();

        for hash in &transaction.blob_versioned_hashes {
            hashes.append(hash.as_bytes());
        }

        fields
            .append_u256(transaction.max_fee_per_blob_gas.unwrap_or_default())
            .append_list(&hashes);
    }

    if transaction_type == SET_CODE_TRANSACTION_TYPE {
        fields.append_list(&authorization_list(&transaction.authorization_list));
    }

    // Typed transactions sign `type || rlp(fields)`.
    let mut payload = vec![u8::try_from(transaction_type)?];
    fields.encode(&mut payload);

    Ok((H256(signing::keccak256(&payload)), recovery_id))
}

fn legacy_signing_hash(transaction: &RpcTransaction) -> Result<(H256, i32)> {
    let invalid_v = || Error::InvalidV {
        hash: transaction.hash,
        v: transaction.v,
    };

    let v = u64::try_from(transaction.v).map_err(|_| invalid_v())?;

    let mut fields = RlpList::default();

    fields
        .append(&transaction.nonce)
        .append_u256(transaction.gas_price.unwrap_or_default())
        .append(&transaction.gas)
        .append_address(transaction.to)
        .append_u256(transaction.value)
        .append(transaction.input.as_slice());

    let parity = match v {
        27 | 28 => v - HOMESTEAD_V_OFFSET,
        _ if v >= EIP155_V_OFFSET => {
            let chain_id = (v - EIP155_V_OFFSET) / 2;
            fields.append(&chain_id).append(&0_u8).append(&0_u8);
            (v - EIP155_V_OFFSET) % 2
        }
        _ => bail!(invalid_v()),
    };

    let mut payload = vec![];
    fields.encode(&mut payload);

    Ok((H256(signing::keccak256(&payload)), i32::from(parity == 1)))
}

fn access_list(items: &[AccessListItem]) -> RlpList {
    let mut list = RlpList::default();

    for item in items {
        let mut storage_keys = RlpList::default();

        for key in &item.storage_keys {
            storage_keys.append(key.as_bytes());
        }

        let mut entry = RlpList::default();
        entry
            .append(item.address.as_bytes())
            .append_list(&storage_keys);

        list.append_list(&entry);
    }

    list
}

fn authorization_list(authorizations: &[Authorization]) -> RlpList {
    let mut list = RlpList::default();

    for authorization in authorizations {
        let mut entry = RlpList::default();

        entry
            .append_u256(authorization.chain_id)
            .append(authorization.address.as_bytes())
            .append(&authorization.nonce)
            .append_u256(authorization.y_parity)
            .append_u256(authorization.r)
            .append_u256(authorization.s);

        list.append_list(&entry);
    }

    list
}

/// RLP list built one item at a time.
#[derive(Default)]
struct RlpList {
    payload: Vec<u8>,
}

impl RlpList {
    fn append(&mut self, item: &(impl Encodable + ?Sized)) -> &mut Self {
        item.encode(&mut self.payload);
        self
    }

    // RLP integers are big-endian without leading zeros.
    fn append_u256(&mut self, value: U256) -> &mut Self {
        let mut bytes = [0; 32];
        value.to_big_endian(&mut bytes);
        let leading_zeros = bytes.iter().take_while(|byte| **byte == 0).count();
        self.append(&bytes[leading_zeros..])
    }

    // Contract creations have an empty string in place of the recipient.
    fn append_address(&mut self, address: Option<ExecutionAddress>) -> &mut Self {
        match address {
            Some(address) => self.append(address.as_bytes()),
            None => self.append(&[0_u8; 0][..]),
        }
    }

    fn append_list(&mut self, list: &Self) -> &mut Self {
        list.encode(&mut self.payload);
        self
    }

    fn encode(&self, out: &mut Vec<u8>) {
        Header {
            list: true,
            payload_length: self.payload.len(),
        }
        .encode(out);

        out.extend_from_slice(&self.payload);
    }
}
