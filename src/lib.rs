//! Contract ABI type system and head/tail codec
//!
//! - [`Type`] parses signatures (`tuple(address to, uint256[] ids)`) or
//!   structured field descriptions into an immutable type tree.
//! - [`encode`] / [`decode`] convert between [`Value`] trees and the 32-byte
//!   word encoding used by contract calls, return data and event payloads.
//! - [`mapper`] projects decoded values onto caller-defined records.
//! - [`domain::abi`] derives selectors and topics from contract descriptions.
//!
//! ```
//! use abicodec::{decode, encode, Type, Value};
//!
//! let ty = Type::parse("tuple(uint32 x, bool y)").unwrap();
//! let value = Value::tuple([("x", Value::from(69u32)), ("y", Value::Bool(true))]);
//! let encoded = encode(&ty, &value).unwrap();
//! assert_eq!(encoded.len(), 64);
//! assert_eq!(decode(&ty, &encoded).unwrap(), value);
//! ```

pub mod codec;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod mapper;
pub mod store;

pub use crate::codec::{decode, encode, DecodeLimits, Decoder, WORD_SIZE};
pub use crate::core::{FieldDescription, TupleField, Type, TypeKind, Value};
pub use crate::domain::abi::{Abi, ErrorDef, Event, Method, StateMutability};
pub use crate::error::{Error, Result};
pub use crate::mapper::{decode_into, FromValue, RecordSchema};
pub use crate::store::TypeCache;
