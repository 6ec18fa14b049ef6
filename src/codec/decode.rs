//! Bytes -> value

use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};
use tracing::trace;

use super::{words_for, WORD_SIZE};
use crate::core::types::{Shape, TupleField, ADDRESS_SIZE, FUNCTION_SIZE};
use crate::core::value::i256_from_i128;
use crate::core::{Type, Value};
use crate::{Error, Result};

/// Default bound on the bit length of decoded offsets and lengths
pub const DEFAULT_MAX_OFFSET_BITS: u32 = 63;

/// Safety limits applied while decoding
///
/// The offset bound is not part of the wire format; it only keeps hostile
/// input from producing offsets that overflow native integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Offsets and lengths with a larger bit length are rejected
    pub max_offset_bits: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_offset_bits: DEFAULT_MAX_OFFSET_BITS,
        }
    }
}

/// Decoder configured with a set of [`DecodeLimits`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    limits: DecodeLimits,
}

/// Decode `data` as an instance of `ty` with default limits
pub fn decode(ty: &Type, data: &[u8]) -> Result<Value> {
    Decoder::default().decode(ty, data)
}

impl Decoder {
    pub fn new(limits: DecodeLimits) -> Self {
        // offsets are read from the low 8 bytes of a word
        let max_offset_bits = limits.max_offset_bits.min(64);
        Self {
            limits: DecodeLimits { max_offset_bits },
        }
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Decode `data` as an instance of `ty`
    pub fn decode(&self, ty: &Type, data: &[u8]) -> Result<Value> {
        if data.len() < WORD_SIZE {
            return Err(Error::truncated(WORD_SIZE, data.len()));
        }
        let (value, _) = self.decode_value(ty, data)?;
        trace!(ty = %ty, bytes = data.len(), "decoded value");
        Ok(value)
    }

    /// Decode one item starting at `input`, returning the unread remainder
    fn decode_value<'a>(&self, ty: &Type, input: &'a [u8]) -> Result<(Value, &'a [u8])> {
        if input.len() < WORD_SIZE {
            return Err(Error::truncated(WORD_SIZE, input.len()));
        }

        let (word, rest) = input.split_at(WORD_SIZE);
        let value = match &ty.shape {
            Shape::Tuple(fields) => return self.decode_tuple(fields, input),
            Shape::Slice(elem) => {
                let count = self.read_length(input)?;
                return self.decode_sequence(elem, rest, count);
            }
            Shape::Array(elem, len) => return self.decode_sequence(elem, input, *len),
            Shape::String | Shape::Bytes => {
                let len = self.read_length(input)?;
                let payload = rest[..len].to_vec();
                let end = (words_for(len) * WORD_SIZE).min(rest.len());
                let value = if ty.shape == Shape::String {
                    Value::String(String::from_utf8(payload).map_err(|err| {
                        Error::Format(format!("string is not valid utf-8: {}", err))
                    })?)
                } else {
                    Value::Bytes(payload)
                };
                return Ok((value, &rest[end..]));
            }
            Shape::Bool => match word[WORD_SIZE - 1] {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => {
                    return Err(Error::Format(format!(
                        "boolean word ends with {:#04x}",
                        other
                    )))
                }
            },
            Shape::Int(bits) => Value::Int(read_signed(word, *bits)),
            Shape::UInt(bits) => Value::Uint(read_unsigned(word, *bits)),
            Shape::Address => Value::Address(Address::from_slice(&word[WORD_SIZE - ADDRESS_SIZE..])),
            Shape::FixedBytes(size) => Value::FixedBytes(word[..*size].to_vec()),
            Shape::Function => {
                if word[FUNCTION_SIZE..].iter().any(|b| *b != 0) {
                    return Err(Error::Format(format!(
                        "function word expects the last 8 bytes to be empty, found 0x{}",
                        hex::encode(&word[FUNCTION_SIZE..])
                    )));
                }
                let mut func = [0u8; FUNCTION_SIZE];
                func.copy_from_slice(&word[..FUNCTION_SIZE]);
                Value::Function(func)
            }
        };
        Ok((value, rest))
    }

    fn decode_tuple<'a>(
        &self,
        fields: &[TupleField],
        data: &'a [u8],
    ) -> Result<(Value, &'a [u8])> {
        let base = data;
        let mut cursor = data;
        let mut entries = BTreeMap::new();

        for (position, field) in fields.iter().enumerate() {
            let (value, rest) = self.decode_item(&field.ty, base, cursor)?;
            cursor = rest;

            let key = field.key(position);
            if entries.contains_key(&key) {
                return Err(Error::DuplicateField(key));
            }
            entries.insert(key, value);
        }

        Ok((Value::Tuple(entries), cursor))
    }

    fn decode_sequence<'a>(
        &self,
        elem: &Type,
        data: &'a [u8],
        count: usize,
    ) -> Result<(Value, &'a [u8])> {
        let needed = count
            .checked_mul(WORD_SIZE)
            .ok_or_else(|| Error::Bounds(format!("element count {} overflows", count)))?;
        if needed > data.len() {
            return Err(Error::Bounds(format!(
                "{} elements need at least {} bytes, have {}",
                count,
                needed,
                data.len()
            )));
        }

        let base = data;
        let mut cursor = data;
        let mut items = Vec::with_capacity(count);

        for _ in 0..count {
            let (value, rest) = self.decode_item(elem, base, cursor)?;
            cursor = rest;
            items.push(value);
        }

        Ok((Value::Array(items), cursor))
    }

    /// Decode the item whose head slot starts at `cursor`
    ///
    /// Dynamic items follow their offset from `base` and consume one head
    /// word; static items are read in place and consume their full width.
    fn decode_item<'a>(
        &self,
        ty: &Type,
        base: &'a [u8],
        cursor: &'a [u8],
    ) -> Result<(Value, &'a [u8])> {
        if cursor.len() < WORD_SIZE {
            return Err(Error::truncated(WORD_SIZE, cursor.len()));
        }

        if ty.is_dynamic() {
            let offset = self.read_offset(cursor, base.len())?;
            let (value, _) = self.decode_value(ty, &base[offset..])?;
            Ok((value, &cursor[WORD_SIZE..]))
        } else {
            self.decode_value(ty, cursor)
        }
    }

    /// Read a word as a bounded native integer
    fn read_bounded(&self, word: &[u8], what: &str) -> Result<usize> {
        let value = U256::from_be_slice(&word[..WORD_SIZE]);
        if value.bit_len() > self.limits.max_offset_bits as usize {
            return Err(Error::Bounds(format!(
                "{} {} exceeds the {}-bit limit",
                what, value, self.limits.max_offset_bits
            )));
        }

        let mut low = [0u8; 8];
        low.copy_from_slice(&word[WORD_SIZE - 8..WORD_SIZE]);
        usize::try_from(u64::from_be_bytes(low))
            .map_err(|_| Error::Bounds(format!("{} {} does not fit in memory", what, value)))
    }

    fn read_offset(&self, cursor: &[u8], available: usize) -> Result<usize> {
        let offset = self.read_bounded(cursor, "offset")?;
        if offset > available {
            return Err(Error::Bounds(format!(
                "offset {} points past the {} available bytes",
                offset, available
            )));
        }
        Ok(offset)
    }

    /// Length word at the start of `input`, checked against the bytes after it
    fn read_length(&self, input: &[u8]) -> Result<usize> {
        let len = self.read_bounded(input, "length")?;
        let available = input.len() - WORD_SIZE;
        if len > available {
            return Err(Error::Bounds(format!(
                "length {} exceeds the {} available bytes",
                len, available
            )));
        }
        Ok(len)
    }
}

/// Integers up to 64 bits are sign-extended natively from their low bytes;
/// wider ones take the whole word as 256-bit two's complement.
fn read_signed(word: &[u8], bits: usize) -> I256 {
    if bits <= 64 {
        let size = bits / 8;
        let low = &word[WORD_SIZE - size..WORD_SIZE];
        let fill = if low[0] & 0x80 != 0 { 0xff } else { 0x00 };
        let mut buf = [fill; 8];
        buf[8 - size..].copy_from_slice(low);
        i256_from_i128(i128::from(i64::from_be_bytes(buf)))
    } else {
        let mut full = [0u8; WORD_SIZE];
        full.copy_from_slice(&word[..WORD_SIZE]);
        I256::from_be_bytes(full)
    }
}

fn read_unsigned(word: &[u8], bits: usize) -> U256 {
    if bits <= 64 {
        let size = bits / 8;
        let mut buf = [0u8; 8];
        buf[8 - size..].copy_from_slice(&word[WORD_SIZE - size..WORD_SIZE]);
        U256::from(u64::from_be_bytes(buf))
    } else {
        U256::from_be_slice(&word[..WORD_SIZE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;

    fn word(hex_str: &str) -> Vec<u8> {
        let mut out = vec![0u8; WORD_SIZE];
        let bytes = hex::decode(hex_str).unwrap();
        out[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
        out
    }

    fn ty(signature: &str) -> Type {
        Type::parse(signature).unwrap()
    }

    #[test]
    fn test_short_input_is_truncated() {
        for signature in ["bool", "uint256", "string", "tuple()", "tuple(string)", "uint8[]"] {
            for len in [0, 1, 31] {
                let err = decode(&ty(signature), &vec![0u8; len]).unwrap_err();
                assert!(matches!(err, Error::Truncated { .. }), "{} with {} bytes", signature, len);
            }
        }
    }

    #[test]
    fn test_integers() {
        let minus_one = vec![0xffu8; 32];
        assert_eq!(decode(&ty("int32"), &minus_one).unwrap(), Value::from(-1i32));
        assert_eq!(decode(&ty("int256"), &minus_one).unwrap(), Value::from(-1i32));
        assert_eq!(decode(&ty("int128"), &minus_one).unwrap(), Value::from(-1i32));
        assert_eq!(decode(&ty("uint32"), &word("45")).unwrap(), Value::from(69u32));

        // wide unsigned values stay positive
        assert_eq!(
            decode(&ty("uint256"), &minus_one).unwrap(),
            Value::Uint(U256::MAX)
        );

        // narrow types only look at their own bytes
        assert_eq!(decode(&ty("int8"), &word("0180")).unwrap(), Value::from(-128i32));
    }

    #[test]
    fn test_bool_format() {
        assert_eq!(decode(&Type::bool(), &word("01")).unwrap(), Value::Bool(true));
        assert_eq!(decode(&Type::bool(), &word("00")).unwrap(), Value::Bool(false));
        let err = decode(&Type::bool(), &word("02")).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_function_padding() {
        let mut data = vec![0x33u8; 24];
        data.extend_from_slice(&[0u8; 8]);
        assert_eq!(
            decode(&Type::function(), &data).unwrap(),
            Value::Function([0x33; 24])
        );

        data[31] = 1;
        assert!(matches!(
            decode(&Type::function(), &data),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_tuple_keys() {
        let ty = ty("tuple(uint8, bool)");
        let mut data = word("05");
        data.extend(word("01"));
        let value = decode(&ty, &data).unwrap();
        assert_eq!(value.get("0"), Some(&Value::from(5u8)));
        assert_eq!(value.get("1"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_duplicate_field() {
        let ty = ty("tuple(uint8 x, uint8 x)");
        let mut data = word("01");
        data.extend(word("02"));
        assert_eq!(decode(&ty, &data), Err(Error::DuplicateField("x".to_string())));

        // a name that collides with a positional default
        let ty = Type::parse("tuple(uint8 1, uint8)").unwrap();
        assert_eq!(decode(&ty, &data), Err(Error::DuplicateField("1".to_string())));
    }

    #[test]
    fn test_offset_beyond_buffer() {
        let mut data = word("60");
        data.extend(word("00"));
        let err = decode(&ty("tuple(string)"), &data).unwrap_err();
        assert!(matches!(err, Error::Bounds(_)));
    }

    #[test]
    fn test_offset_above_safety_limit() {
        let mut data = vec![0u8; WORD_SIZE];
        data[WORD_SIZE - 8] = 0x80; // bit 63 set
        data.extend(word("00"));
        let err = decode(&ty("tuple(bytes)"), &data).unwrap_err();
        assert!(matches!(err, Error::Bounds(_)));

        let decoder = Decoder::new(DecodeLimits { max_offset_bits: 8 });
        let mut data = word("0100");
        data.extend(vec![0u8; 0x120]);
        assert!(matches!(
            decoder.decode(&ty("tuple(bytes)"), &data),
            Err(Error::Bounds(_))
        ));
        assert!(decode(&ty("tuple(bytes)"), &data).is_ok());
    }

    #[test]
    fn test_length_beyond_buffer() {
        let mut data = word("20");
        data.extend(word("40")); // 64 bytes declared, none present
        let err = decode(&ty("tuple(bytes)"), &data).unwrap_err();
        assert!(matches!(err, Error::Bounds(_)));

        // element count larger than the remaining words
        let data = word("05");
        let err = decode(&ty("uint8[]"), &data).unwrap_err();
        assert!(matches!(err, Error::Bounds(_)));
    }

    #[test]
    fn test_dynamic_length_out_of_bounds() {
        let mut input = b"00000000000000000000000000000000".to_vec();
        input.extend_from_slice(&[0u8; 31]);
        input.push(b' ');
        input.extend_from_slice(b"00000000000000000000000000");
        let err = decode(&ty("tuple(bytes32, bytes, bytes)"), &input);
        assert!(err.is_err());
    }

    #[test]
    fn test_static_words_match_consumed() {
        let ty = ty("tuple(uint8,tuple(address,bytes4)[3],bool)");
        let value = Value::Array(vec![
            Value::from(1u8),
            Value::Array(
                (0..3)
                    .map(|i| {
                        Value::Array(vec![
                            Value::Address(Address::repeat_byte(i)),
                            Value::FixedBytes(vec![i; 4]),
                        ])
                    })
                    .collect(),
            ),
            Value::Bool(true),
        ]);

        let mut data = encode(&ty, &value).unwrap();
        assert_eq!(data.len(), ty.static_words().unwrap() * WORD_SIZE);

        data.extend(word("ff"));
        let (_, rest) = Decoder::default().decode_value(&ty, &data).unwrap();
        assert_eq!(rest.len(), WORD_SIZE);
    }

    #[test]
    fn test_empty_elements_preserved() {
        let ty = ty("bytes[]");
        let value = Value::Array(vec![
            Value::Bytes(vec![]),
            Value::Bytes(vec![0xaa; 40]),
            Value::Bytes(vec![]),
            Value::Bytes(b"xyz".to_vec()),
        ]);
        let encoded = encode(&ty, &value).unwrap();
        assert_eq!(decode(&ty, &encoded).unwrap(), value);
    }
}
