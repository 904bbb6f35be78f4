//! Translation of aggregation bits into validator indices.

use anyhow::{Context as _, Result};
use helper_functions::bitlist::Bitlist;
use log::error;
use types::{
    assignments::EpochAssignments,
    consensus::{Attestation, AttestationData},
    consts::UNKNOWN_VALIDATOR_INDEX,
    primitives::ValidatorIndex,
};

/// Indices of validators whose bits are set in `attestation`, in committee order.
///
/// `assignments` must be those of the epoch the attestation votes in, not the epoch of the block
/// including it. Attestations can be included up to an epoch after they are made.
///
/// A set bit without a matching duty is logged and mapped to [`UNKNOWN_VALIDATOR_INDEX`] so that
/// the number of attesters always equals the number of set bits.
pub fn resolve_attesters(
    attestation: &Attestation,
    assignments: &EpochAssignments,
) -> Result<Vec<ValidatorIndex>> {
    let AttestationData { slot, index, .. } = attestation.data;

    let aggregation_bits = Bitlist::decode(&attestation.aggregation_bits).with_context(|| {
        format!("failed to decode aggregation bits of attestation at slot {slot}")
    })?;

    aggregation_bits
        .iter_ones()
        .map(|position| -> Result<ValidatorIndex> {
            let position = u64::try_from(position)?;

            let validator_index = assignments
                .attester(slot, index, position)
                .unwrap_or_else(|| {
                    error!(
                        "attestation at slot {slot} has bit {position} set in committee {index} \
                         but no validator is assigned to that position",
                    );

                    UNKNOWN_VALIDATOR_INDEX
                });

            Ok(validator_index)
        })
        .collect()
}

/// Fills in [`Attestation::attesters`] using [`resolve_attesters`].
pub fn resolve_in_place(
    attestation: &mut Attestation,
    assignments: &EpochAssignments,
) -> Result<()> {
    attestation.attesters = resolve_attesters(attestation, assignments)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    fn assignments() -> EpochAssignments {
        let mut assignments = EpochAssignments::default();
        assignments.insert_committee(70, 1, [40, 41, 42, 43]);
        assignments.insert_committee(70, 2, [50, 51]);
        assignments
    }

    fn attestation(committee_index: u64, aggregation_bits: &[u8]) -> Attestation {
        Attestation {
            aggregation_bits: aggregation_bits.to_vec(),
            data: AttestationData {
                slot: 70,
                index: committee_index,
                ..AttestationData::default()
            },
            ..Attestation::default()
        }
    }

    #[test]
    fn set_bits_map_to_committee_members() -> Result<()> {
        // Bits 0 and 2 set, length 4.
        let attestation = attestation(1, &hex!("15"));

        assert_eq!(resolve_attesters(&attestation, &assignments())?, [40, 42]);

        Ok(())
    }

    #[test]
    fn resolution_is_deterministic() -> Result<()> {
        let attestation = attestation(1, &hex!("1e"));
        let assignments = assignments();

        let first = resolve_attesters(&attestation, &assignments)?;
        let second = resolve_attesters(&attestation, &assignments)?;

        assert_eq!(first, [41, 42, 43]);
        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn unmatched_bits_are_kept_as_unknown() -> Result<()> {
        testing_logger::setup();

        // Committee 2 only has 2 members, but bits 0 and 3 are set.
        let attestation = attestation(2, &hex!("19"));

        assert_eq!(
            resolve_attesters(&attestation, &assignments())?,
            [50, UNKNOWN_VALIDATOR_INDEX],
        );

        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 1);
            assert_eq!(captured_logs[0].level, log::Level::Error);
            assert!(captured_logs[0].body.contains("bit 3"));
        });

        Ok(())
    }

    #[test]
    fn resolve_in_place_fills_attesters() -> Result<()> {
        let mut attestation = attestation(2, &hex!("07"));

        resolve_in_place(&mut attestation, &assignments())?;

        assert_eq!(attestation.attesters, [50, 51]);

        Ok(())
    }

    #[test]
    fn malformed_bits_are_an_error() {
        let attestation = attestation(1, &hex!("00"));

        resolve_attesters(&attestation, &assignments())
            .expect_err("bitlist without delimiter should be rejected");
    }
}
