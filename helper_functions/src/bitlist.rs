//! Decoding of SSZ bitlists as they appear in `aggregation_bits`.
//!
//! Bits are stored little-endian within each byte. The highest set bit of the last byte is not
//! part of the list. It marks the end of the list and thus encodes its length.
//! See <https://github.com/ethereum/consensus-specs/blob/dev/ssz/simple-serialize.md#bitlistn>.

use anyhow::Result;

use crate::error::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bitlist<'bytes> {
    bytes: &'bytes [u8],
    len: usize,
}

impl<'bytes> Bitlist<'bytes> {
    pub fn decode(bytes: &'bytes [u8]) -> Result<Self> {
        let (last_byte, full_bytes) = bytes.split_last().ok_or(Error::BitlistEmpty)?;

        let delimiter = (0..8_usize)
            .rev()
            .find(|bit| last_byte & (1_u8 << bit) != 0)
            .ok_or(Error::BitlistMissingDelimiter)?;

        Ok(Self {
            bytes,
            len: full_bytes.len() * 8 + delimiter,
        })
    }

    #[must_use]
    pub fn get(self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }

        self.bytes
            .get(index / 8)
            .is_some_and(|byte| byte & (1_u8 << (index % 8)) != 0)
    }

    /// Positions of set bits in ascending order.
    pub fn iter_ones(self) -> impl Iterator<Item = usize> + 'bytes {
        (0..self.len).filter(move |index| self.get(*index))
    }
}
