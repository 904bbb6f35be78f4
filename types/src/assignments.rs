use std::collections::{BTreeMap, HashMap};

use crate::primitives::{CommitteeIndex, Slot, ValidatorIndex};

/// Identifies one member of one committee.
///
/// `position` is the member's offset in the committee, which is also the index of its bit in
/// the aggregation bitlist of any attestation made by the committee.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AttesterKey {
    pub slot: Slot,
    pub committee_index: CommitteeIndex,
    pub position: u64,
}

/// Proposer and attester duties of a single epoch.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct EpochAssignments {
    pub proposer_assignments: BTreeMap<Slot, ValidatorIndex>,
    pub attester_assignments: HashMap<AttesterKey, ValidatorIndex>,
}

impl EpochAssignments {
    /// Whether both duty maps have been populated.
    ///
    /// Nodes sometimes answer with an empty validator set while still syncing.
    /// Assignments that are not complete must not be memoized.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.proposer_assignments.is_empty() && !self.attester_assignments.is_empty()
    }

    #[must_use]
    pub fn proposer(&self, slot: Slot) -> Option<ValidatorIndex> {
        self.proposer_assignments.get(&slot).copied()
    }

    #[must_use]
    pub fn attester(
        &self,
        slot: Slot,
        committee_index: CommitteeIndex,
        position: u64,
    ) -> Option<ValidatorIndex> {
        let key = AttesterKey {
            slot,
            committee_index,
            position,
        };

        self.attester_assignments.get(&key).copied()
    }

    pub fn insert_committee(
        &mut self,
        slot: Slot,
        committee_index: CommitteeIndex,
        members: impl IntoIterator<Item = ValidatorIndex>,
    ) {
        for (position, validator_index) in (0..).zip(members) {
            let key = AttesterKey {
                slot,
                committee_index,
                position,
            };

            self.attester_assignments.insert(key, validator_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_are_complete_only_with_both_maps() {
        let mut assignments = EpochAssignments::default();
        assert!(!assignments.is_complete());

        assignments.proposer_assignments.insert(33, 7);
        assert!(!assignments.is_complete());

        assignments.insert_committee(33, 0, [7, 8]);
        assert!(assignments.is_complete());
    }

    #[test]
    fn committee_members_are_keyed_by_position() {
        let mut assignments = EpochAssignments::default();

        assignments.insert_committee(40, 2, [11, 5, 9]);

        assert_eq!(assignments.attester(40, 2, 0), Some(11));
        assert_eq!(assignments.attester(40, 2, 1), Some(5));
        assert_eq!(assignments.attester(40, 2, 2), Some(9));
        assert_eq!(assignments.attester(40, 2, 3), None);
        assert_eq!(assignments.attester(40, 1, 0), None);
    }
}
