use derive_more::derive::AsRef;
use fixed_hash::construct_fixed_hash;
use impl_serde::impl_fixed_hash_serde;

pub use ethereum_types::{Bloom, H160, H256, H64, U256, U64};

pub type ChainId = u64;
pub type CommitteeIndex = u64;
pub type Epoch = u64;
pub type ExecutionAddress = H160;
pub type ExecutionBlockHash = H256;
pub type ExecutionBlockNumber = u64;
pub type Gwei = u64;
pub type Slot = u64;
pub type UnixSeconds = u64;
pub type ValidatorIndex = u64;
pub type Wei = U256;

pub const PUBLIC_KEY_SIZE: usize = 48;
pub const SIGNATURE_SIZE: usize = 96;

construct_fixed_hash! {
    /// Compressed BLS public key. Never decompressed or verified here.
    #[derive(AsRef)]
    pub struct PublicKeyBytes(PUBLIC_KEY_SIZE);
}

impl_fixed_hash_serde!(PublicKeyBytes, PUBLIC_KEY_SIZE);

construct_fixed_hash! {
    #[derive(AsRef)]
    pub struct SignatureBytes(SIGNATURE_SIZE);
}

impl_fixed_hash_serde!(SignatureBytes, SIGNATURE_SIZE);
