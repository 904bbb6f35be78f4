use core::{fmt::Debug, hash::Hash, num::NonZeroU64};

use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typenum::{NonZero, Unsigned, U32, U8};

/// Compile-time configuration variables.
///
/// Only the variables needed to split the chain into epochs and committees are included.
pub trait Preset: Copy + Eq + Ord + Hash + Default + Debug + Send + Sync + 'static {
    type SlotsPerEpoch: Unsigned + NonZero;

    const NAME: PresetName;

    const MAX_COMMITTEES_PER_SLOT: NonZeroU64 = nonzero!(64_u64);
    const TARGET_COMMITTEE_SIZE: NonZeroU64 = nonzero!(128_u64);
}

/// [Mainnet preset](https://github.com/ethereum/consensus-specs/tree/dev/presets/mainnet).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Mainnet;

impl Preset for Mainnet {
    type SlotsPerEpoch = U32;

    const NAME: PresetName = PresetName::Mainnet;
}

/// [Minimal preset](https://github.com/ethereum/consensus-specs/tree/dev/presets/minimal).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Minimal;

impl Preset for Minimal {
    type SlotsPerEpoch = U8;

    const NAME: PresetName = PresetName::Minimal;

    const MAX_COMMITTEES_PER_SLOT: NonZeroU64 = nonzero!(4_u64);
    const TARGET_COMMITTEE_SIZE: NonZeroU64 = nonzero!(4_u64);
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresetName {
    #[default]
    Mainnet,
    Minimal,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(PresetName::Mainnet, "mainnet")]
    #[test_case(PresetName::Minimal, "minimal")]
    fn preset_name_round_trips_through_strings(name: PresetName, string: &str) {
        assert_eq!(name.to_string(), string);
        assert_eq!(string.parse(), Ok(name));
    }

    #[test]
    fn presets_report_their_own_names() {
        assert_eq!(Mainnet::NAME, PresetName::Mainnet);
        assert_eq!(Minimal::NAME, PresetName::Minimal);
        assert_eq!(<Mainnet as Preset>::SlotsPerEpoch::U64, 32);
        assert_eq!(<Minimal as Preset>::SlotsPerEpoch::U64, 8);
    }
}
