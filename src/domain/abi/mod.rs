//! Contract descriptions
//!
//! An [`Abi`] holds the functions, events and custom errors of one contract,
//! loaded from compiler JSON or from human-readable declarations. Each entry
//! wraps its arguments in a tuple [`Type`](crate::Type) and delegates the byte
//! work to the codec.

mod decoder;
mod human;
mod method;
mod registry;

pub use decoder::{DecodedArg, DecodedCall};
pub use method::{ErrorDef, Event, Method, StateMutability, SELECTOR_SIZE};
pub use registry::Abi;
