use thiserror::Error;
use types::primitives::{Epoch, Slot};

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub(crate) enum Error {
    #[error("bitlist is empty and thus has no length delimiter")]
    BitlistEmpty,
    #[error("last byte of bitlist is zero and thus has no length delimiter")]
    BitlistMissingDelimiter,
    #[error("epoch {epoch} is too far in the future to be represented")]
    EpochOutOfBounds { epoch: Epoch },
    #[error("start time of slot {slot} is too far in the future to be represented")]
    SlotOutOfBounds { slot: Slot },
}
