//! Domain models layered over the codec

pub mod abi;
