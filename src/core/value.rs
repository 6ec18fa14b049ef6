//! Dynamic ABI values

use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::{Address, I256, U256};

use super::types::FUNCTION_SIZE;

/// A value tree mirroring an ABI [`Type`](super::Type)
///
/// Slices and fixed arrays both decode to [`Value::Array`]; tuples decode to a
/// name-keyed [`Value::Tuple`] where unnamed fields use their position as key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    /// Signed integer, any width up to 256 bits
    Int(I256),
    /// Unsigned integer, any width up to 256 bits
    Uint(U256),
    Address(Address),
    /// `bytesN` payload, exactly N bytes
    FixedBytes(Vec<u8>),
    /// 20-byte address followed by a 4-byte selector
    Function([u8; FUNCTION_SIZE]),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    Tuple(BTreeMap<String, Value>),
}

impl Value {
    /// Build a tuple value from `(key, value)` pairs
    pub fn tuple<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Tuple(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Signed integer from a primitive
    pub fn int(value: i128) -> Self {
        Self::Int(i256_from_i128(value))
    }

    /// Short name of the value's kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Address(_) => "address",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Function(_) => "function",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Payload of `Bytes` and `FixedBytes`
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) | Self::FixedBytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Tuple(entries) => Some(entries),
            _ => None,
        }
    }

    /// Tuple entry by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_tuple().and_then(|entries| entries.get(key))
    }
}

/// Two's complement 256-bit value of a primitive signed integer
pub(crate) fn i256_from_i128(value: i128) -> I256 {
    let mut word = if value < 0 { [0xffu8; 32] } else { [0u8; 32] };
    word[16..].copy_from_slice(&value.to_be_bytes());
    I256::from_be_bytes(word)
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::Uint(U256::from(value))
                }
            }
        )*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::Int(i256_from_i128(i128::from(value)))
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128);
impl_from_signed!(i8, i16, i32, i64, i128);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<I256> for Value {
    fn from(value: I256) -> Self {
        Self::Int(value)
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Uint(u) => write!(f, "{}", u),
            Self::Address(addr) => write!(f, "{}", addr),
            Self::FixedBytes(bytes) | Self::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Self::Function(func) => write!(f, "0x{}", hex::encode(func)),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Tuple(entries) => {
                f.write_str("(")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_conversion() {
        let Value::Int(minus_one) = Value::from(-1i32) else {
            panic!("expected int");
        };
        assert_eq!(minus_one.to_be_bytes::<32>(), [0xff; 32]);
        assert_eq!(Value::int(-5), Value::from(-5i64));
    }

    #[test]
    fn test_display() {
        let value = Value::tuple([
            ("amount", Value::from(1000u64)),
            ("data", Value::Bytes(vec![0xde, 0xad])),
            ("tags", Value::Array(vec![Value::from("a"), Value::from(true)])),
        ]);
        assert_eq!(
            value.to_string(),
            r#"(amount: 1000, data: 0xdead, tags: ["a", true])"#
        );
        assert_eq!(Value::from(-42i8).to_string(), "-42");
    }

    #[test]
    fn test_accessors() {
        let value = Value::tuple([("0", Value::from(7u8))]);
        assert_eq!(value.get("0").and_then(Value::as_uint), Some(U256::from(7u8)));
        assert!(value.get("1").is_none());
        assert_eq!(Value::Bytes(vec![1]).as_bytes(), Some(&[1u8][..]));
        assert_eq!(Value::from("x").kind_name(), "string");
    }
}
