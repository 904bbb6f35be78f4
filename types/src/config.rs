use core::{num::NonZeroU64, time::Duration};
use std::borrow::Cow;

use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

use crate::{
    preset::PresetName,
    primitives::{ChainId, UnixSeconds},
};

/// Chain parameters that are not known at compile time.
///
/// Deserializes from the same `SCREAMING_SNAKE_CASE` files beacon nodes use.
/// Fields missing from the input take their values from [`Config::mainnet`].
#[expect(
    clippy::unsafe_derive_deserialize,
    reason = "A false positive triggered by `nonzero!`. \
              The `unsafe` block in `nonzero!` only operates on the literal passed to it."
)]
#[expect(
    clippy::struct_field_names,
    reason = "`config_name` mirrors the key used in configuration files"
)]
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub config_name: Cow<'static, str>,
    pub preset_base: PresetName,
    #[serde(with = "serde_utils::string_or_native")]
    pub genesis_time: UnixSeconds,
    #[serde(with = "serde_utils::string_or_native")]
    pub seconds_per_slot: NonZeroU64,
    #[serde(with = "serde_utils::string_or_native")]
    pub deposit_chain_id: ChainId,
}

impl Default for Config {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl Config {
    #[must_use]
    pub const fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),
            preset_base: PresetName::Mainnet,
            genesis_time: 1_606_824_023,
            seconds_per_slot: nonzero!(12_u64),
            deposit_chain_id: 1,
        }
    }

    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            config_name: Cow::Borrowed("minimal"),
            preset_base: PresetName::Minimal,
            genesis_time: 1_578_009_600,
            seconds_per_slot: nonzero!(6_u64),
            deposit_chain_id: 5,
        }
    }

    #[must_use]
    pub const fn slot_duration(&self) -> Duration {
        Duration::from_secs(self.seconds_per_slot.get())
    }
}
