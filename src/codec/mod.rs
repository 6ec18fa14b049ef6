//! Head/tail ABI codec
//!
//! Values are laid out in 32-byte words. A sequence of items (tuple fields,
//! array elements, call arguments) is written as a head region holding one
//! slot per item, followed by a tail region with the payloads of dynamic
//! items. A dynamic item's head slot holds the byte offset of its payload,
//! measured from the start of that sequence's head region.

mod decode;
mod encode;
mod size;

pub use decode::{decode, DecodeLimits, Decoder, DEFAULT_MAX_OFFSET_BITS};
pub use encode::encode;

/// The 32-byte encoding unit
pub const WORD_SIZE: usize = 32;

pub(crate) type Word = [u8; WORD_SIZE];

/// Number of words needed to hold `len` bytes
pub(crate) fn words_for(len: usize) -> usize {
    (len + WORD_SIZE - 1) / WORD_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_for() {
        assert_eq!(words_for(0), 0);
        assert_eq!(words_for(1), 1);
        assert_eq!(words_for(32), 1);
        assert_eq!(words_for(33), 2);
    }
}
