//! Per-epoch participation summary.

use types::{consensus::ValidatorParticipation, primitives::Epoch};

use crate::backend::ParticipationBalances;

/// Summarizes `balances` for `epoch`.
///
/// The epoch counts as finalized when strictly more than 2/3 of the active balance attested to
/// the correct target. The ratio is compared in integers to avoid rounding at the threshold.
#[must_use]
pub fn aggregate(epoch: Epoch, balances: ParticipationBalances) -> ValidatorParticipation {
    let ParticipationBalances {
        target_attesting_gwei,
        active_gwei,
    } = balances;

    let finalized = u128::from(target_attesting_gwei) * 3 > u128::from(active_gwei) * 2;

    ValidatorParticipation {
        epoch,
        finalized,
        global_participation_rate: participation_rate(target_attesting_gwei, active_gwei),
        voted_ether: target_attesting_gwei,
        eligible_ether: active_gwei,
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "the rate is only used for display"
)]
fn participation_rate(target_attesting_gwei: u64, active_gwei: u64) -> f32 {
    if active_gwei == 0 {
        return 0.0;
    }

    target_attesting_gwei as f32 / active_gwei as f32
}
