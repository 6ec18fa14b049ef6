//! Projection of decoded values onto caller-defined records
//!
//! Targets implement [`FromValue`]. Records describe their fields once with a
//! [`RecordSchema`] (source key, setter, conversion) and reuse it for every
//! decode, so no reflection happens at runtime.
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use abicodec::{decode_into, encode, FromValue, RecordSchema, Result, Type, Value};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Position {
//!     id: u64,
//!     active: bool,
//! }
//!
//! impl FromValue for Position {
//!     fn from_value(value: &Value) -> Result<Self> {
//!         static SCHEMA: LazyLock<RecordSchema<Position>> = LazyLock::new(|| {
//!             RecordSchema::new()
//!                 .field("id", |p: &mut Position, v| p.id = v)
//!                 .field("active", |p: &mut Position, v| p.active = v)
//!         });
//!         SCHEMA.map(value)
//!     }
//! }
//!
//! let ty = Type::parse("tuple(uint32 id, bool active)").unwrap();
//! let data = encode(&ty, &Value::Array(vec![7u32.into(), true.into()])).unwrap();
//! let position: Position = decode_into(&ty, &data).unwrap();
//! assert_eq!(position, Position { id: 7, active: true });
//! ```

use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, FixedBytes, I256, U256};

use crate::codec::{decode, WORD_SIZE};
use crate::core::{Type, Value};
use crate::{Error, Result};

/// Conversion from a decoded [`Value`]
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;

    /// Build a sequence of `Self` straight from a byte payload
    ///
    /// Only `u8` accepts this, which lets `Vec<u8>` and `[u8; N]` targets
    /// take `bytes`/`bytesN` values as well as arrays of small integers.
    #[doc(hidden)]
    fn from_byte_payload(_bytes: &[u8]) -> Option<Vec<Self>> {
        None
    }
}

/// Decode `data` as `ty` and project the result onto `T`
pub fn decode_into<T: FromValue>(ty: &Type, data: &[u8]) -> Result<T> {
    T::from_value(&decode(ty, data)?)
}

type Setter<T> = Box<dyn Fn(&mut T, &Value) -> Result<()> + Send + Sync>;

struct FieldSlot<T> {
    name: String,
    set: Setter<T>,
}

/// Field descriptors for a record type, built once and reused
///
/// Source keys match exactly first, then ASCII case-insensitively. Keys
/// missing from the source leave the record's default in place.
pub struct RecordSchema<T> {
    fields: Vec<FieldSlot<T>>,
}

impl<T: Default> RecordSchema<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Register a field: `name` is the tuple key, `setter` stores the converted value
    pub fn field<F, S>(mut self, name: &str, setter: S) -> Self
    where
        F: FromValue,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.fields.push(FieldSlot {
            name: name.to_string(),
            set: Box::new(move |target, value| {
                setter(target, F::from_value(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Populate a new record from a decoded tuple
    pub fn map(&self, value: &Value) -> Result<T> {
        let Value::Tuple(entries) = value else {
            return Err(Error::mapping(format!(
                "expected a tuple, found {}",
                value.kind_name()
            )));
        };

        let mut record = T::default();
        for slot in &self.fields {
            let Some(source) = lookup(entries, &slot.name) else {
                continue;
            };
            (slot.set)(&mut record, source).map_err(|err| match err {
                Error::Mapping(reason) => Error::mapping(format!("{}: {}", slot.name, reason)),
                other => other,
            })?;
        }
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T: Default> Default for RecordSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a>(entries: &'a BTreeMap<String, Value>, name: &str) -> Option<&'a Value> {
    entries.get(name).or_else(|| {
        entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn mismatch(value: &Value, target: &str) -> Error {
    Error::mapping(format!("cannot represent {} value as {}", value.kind_name(), target))
}

fn out_of_range(value: &Value, target: &str) -> Error {
    Error::mapping(format!("{} is out of range for {}", value, target))
}

/// Big-endian two's complement word of a numeric value
fn numeric_word(value: &Value, target: &str) -> Result<[u8; WORD_SIZE]> {
    match value {
        Value::Uint(u) => Ok(u.to_be_bytes::<WORD_SIZE>()),
        Value::Int(i) => Ok(i.to_be_bytes::<WORD_SIZE>()),
        other => Err(mismatch(other, target)),
    }
}

/// Unsigned target bytes of a numeric value, rejecting negatives and overflow
fn unsigned_bytes<const SIZE: usize>(value: &Value, target: &str) -> Result<[u8; SIZE]> {
    if matches!(value, Value::Int(i) if i.is_negative()) {
        return Err(out_of_range(value, target));
    }
    let word = numeric_word(value, target)?;
    if word[..WORD_SIZE - SIZE].iter().any(|b| *b != 0) {
        return Err(out_of_range(value, target));
    }
    let mut buf = [0u8; SIZE];
    buf.copy_from_slice(&word[WORD_SIZE - SIZE..]);
    Ok(buf)
}

/// Signed target bytes of a numeric value, checking the sign extension
fn signed_bytes<const SIZE: usize>(value: &Value, target: &str) -> Result<[u8; SIZE]> {
    let word = numeric_word(value, target)?;
    if matches!(value, Value::Uint(_)) && word[0] & 0x80 != 0 {
        return Err(out_of_range(value, target));
    }
    let fill = if word[0] & 0x80 != 0 { 0xff } else { 0x00 };
    let fits = word[..WORD_SIZE - SIZE].iter().all(|b| *b == fill)
        && (word[WORD_SIZE - SIZE] & 0x80) == (fill & 0x80);
    if !fits {
        return Err(out_of_range(value, target));
    }
    let mut buf = [0u8; SIZE];
    buf.copy_from_slice(&word[WORD_SIZE - SIZE..]);
    Ok(buf)
}

macro_rules! impl_from_value_int {
    ($convert:ident: $($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self> {
                    let bytes = $convert::<{ std::mem::size_of::<$t>() }>(value, stringify!($t))?;
                    Ok(<$t>::from_be_bytes(bytes))
                }
            }
        )*
    };
}

impl_from_value_int!(unsigned_bytes: u16, u32, u64, u128, usize);
impl_from_value_int!(signed_bytes: i8, i16, i32, i64, i128, isize);

impl FromValue for u8 {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(u8::from_be_bytes(unsigned_bytes::<1>(value, "u8")?))
    }

    fn from_byte_payload(bytes: &[u8]) -> Option<Vec<Self>> {
        Some(bytes.to_vec())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Uint(u) if *u <= U256::from(1u8) => Ok(!u.is_zero()),
            other => Err(mismatch(other, "bool")),
        }
    }
}

impl FromValue for U256 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Uint(u) => Ok(*u),
            Value::Int(i) if !i.is_negative() => Ok(i.into_raw()),
            Value::Int(_) => Err(out_of_range(value, "U256")),
            other => Err(mismatch(other, "U256")),
        }
    }
}

impl FromValue for I256 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Uint(u) => {
                let raw = I256::from_raw(*u);
                if raw.is_negative() {
                    return Err(out_of_range(value, "I256"));
                }
                Ok(raw)
            }
            other => Err(mismatch(other, "I256")),
        }
    }
}

impl FromValue for Address {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Address(addr) => Ok(*addr),
            other => Err(mismatch(other, "address")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch(other, "string")),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bytes(bytes) | Value::FixedBytes(bytes) => Ok(Bytes::copy_from_slice(bytes)),
            other => Err(mismatch(other, "bytes")),
        }
    }
}

impl<const N: usize> FromValue for FixedBytes<N> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::FixedBytes(bytes) | Value::Bytes(bytes) if bytes.len() == N => {
                Ok(FixedBytes::from_slice(bytes))
            }
            Value::FixedBytes(_) | Value::Bytes(_) => Err(Error::mapping(format!(
                "expected {} bytes, found {}",
                N,
                value.as_bytes().map(<[u8]>::len).unwrap_or_default()
            ))),
            other => Err(mismatch(other, "fixed bytes")),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    T::from_value(item).map_err(|err| match err {
                        Error::Mapping(reason) => Error::mapping(format!("[{}]: {}", index, reason)),
                        other => other,
                    })
                })
                .collect(),
            Value::Bytes(bytes) | Value::FixedBytes(bytes) => {
                T::from_byte_payload(bytes).ok_or_else(|| mismatch(value, "sequence"))
            }
            other => Err(mismatch(other, "sequence")),
        }
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: &Value) -> Result<Self> {
        let items = Vec::<T>::from_value(value)?;
        let found = items.len();
        items
            .try_into()
            .map_err(|_| Error::mapping(format!("expected {} elements, found {}", N, found)))
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Tuple(entries) => entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), T::from_value(item)?)))
                .collect(),
            other => Err(mismatch(other, "map")),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Transfer {
        from: Address,
        amount: u128,
        memo: String,
        tags: Vec<u16>,
    }

    fn transfer_schema() -> RecordSchema<Transfer> {
        RecordSchema::new()
            .field("from", |t: &mut Transfer, v| t.from = v)
            .field("amount", |t: &mut Transfer, v| t.amount = v)
            .field("memo", |t: &mut Transfer, v| t.memo = v)
            .field("tags", |t: &mut Transfer, v| t.tags = v)
    }

    #[test]
    fn test_numeric_widening() {
        assert_eq!(u64::from_value(&Value::from(200u8)).unwrap(), 200);
        assert_eq!(i64::from_value(&Value::from(-3i8)).unwrap(), -3);
        assert_eq!(i16::from_value(&Value::from(255u8)).unwrap(), 255);
        assert_eq!(u128::from_value(&Value::from(u64::MAX)).unwrap(), u128::from(u64::MAX));
    }

    #[test]
    fn test_numeric_range() {
        assert!(matches!(u8::from_value(&Value::from(256u32)), Err(Error::Mapping(_))));
        assert!(matches!(u32::from_value(&Value::from(-1i32)), Err(Error::Mapping(_))));
        assert!(matches!(i8::from_value(&Value::from(128u32)), Err(Error::Mapping(_))));
        assert!(matches!(i8::from_value(&Value::from(-129i32)), Err(Error::Mapping(_))));
        assert!(matches!(i64::from_value(&Value::Uint(U256::MAX)), Err(Error::Mapping(_))));
        assert_eq!(i8::from_value(&Value::from(-128i32)).unwrap(), -128);
    }

    #[test]
    fn test_kind_mismatch() {
        let err = u32::from_value(&Value::from("12")).unwrap_err();
        assert!(matches!(err, Error::Mapping(_)));
        assert!(bool::from_value(&Value::from(1u8)).unwrap());
        assert!(bool::from_value(&Value::from(2u8)).is_err());
    }

    #[test]
    fn test_byte_targets() {
        let value = Value::Bytes(vec![1, 2, 3]);
        assert_eq!(Vec::<u8>::from_value(&value).unwrap(), vec![1, 2, 3]);
        assert_eq!(<[u8; 3]>::from_value(&value).unwrap(), [1, 2, 3]);
        assert!(<[u8; 4]>::from_value(&value).is_err());
        assert!(Vec::<u16>::from_value(&value).is_err());

        let fixed = Value::FixedBytes(vec![0xab; 32]);
        assert_eq!(
            FixedBytes::<32>::from_value(&fixed).unwrap(),
            FixedBytes::repeat_byte(0xab)
        );
    }

    #[test]
    fn test_record_mapping() {
        let value = Value::tuple([
            ("from", Value::Address(Address::repeat_byte(0x42))),
            ("Amount", Value::from(1_000_000u64)),
            ("memo", Value::from("rent")),
            ("tags", Value::Array(vec![Value::from(1u8), Value::from(2u8)])),
            ("unused", Value::Bool(false)),
        ]);

        let transfer = transfer_schema().map(&value).unwrap();
        assert_eq!(
            transfer,
            Transfer {
                from: Address::repeat_byte(0x42),
                amount: 1_000_000,
                memo: "rent".to_string(),
                tags: vec![1, 2],
            }
        );
    }

    #[test]
    fn test_record_missing_fields_keep_default() {
        let value = Value::tuple([("memo", Value::from("only memo"))]);
        let transfer = transfer_schema().map(&value).unwrap();
        assert_eq!(transfer.memo, "only memo");
        assert_eq!(transfer.amount, 0);
    }

    #[test]
    fn test_record_errors_name_the_field() {
        let value = Value::tuple([(
            "tags",
            Value::Array(vec![Value::from(1u8), Value::from(70_000u32)]),
        )]);
        let err = transfer_schema().map(&value).unwrap_err();
        let Error::Mapping(reason) = err else {
            panic!("expected mapping error");
        };
        assert!(reason.starts_with("tags: [1]:"), "{}", reason);

        assert!(matches!(
            transfer_schema().map(&Value::Bool(true)),
            Err(Error::Mapping(_))
        ));
    }
}
