//! Decoded call view - arguments flattened into display rows

use serde::{Deserialize, Serialize};

use super::{Abi, Method, SELECTOR_SIZE};
use crate::codec::Decoder;
use crate::Result;

/// A decoded function argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Canonical type (e.g., "address", "uint256", "tuple(uint256,address)")
    pub kind: String,
    /// Decoded value as a formatted string
    pub value: String,
}

/// Result of decoding a function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Function name
    pub function_name: String,
    /// Selector signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Decoded arguments in declaration order
    pub arguments: Vec<DecodedArg>,
}

impl Method {
    /// Decode calldata into display rows
    pub fn decode_call(&self, calldata: &[u8]) -> Result<DecodedCall> {
        self.decode_call_with(&Decoder::default(), calldata)
    }

    pub fn decode_call_with(&self, decoder: &Decoder, calldata: &[u8]) -> Result<DecodedCall> {
        let args = self.decode_input_with(decoder, calldata)?;
        let arguments = self
            .inputs
            .fields()
            .iter()
            .enumerate()
            .map(|(position, field)| {
                let key = field.key(position);
                let name = if field.name.is_empty() {
                    format!("arg{}", position)
                } else {
                    field.name.clone()
                };
                DecodedArg {
                    name,
                    kind: field.ty.to_string(),
                    value: args.get(&key).map(ToString::to_string).unwrap_or_default(),
                }
            })
            .collect();

        Ok(DecodedCall {
            function_name: self.name.clone(),
            signature: self.signature(),
            arguments,
        })
    }
}

impl Abi {
    /// Decode calldata by looking up its selector
    ///
    /// Returns `Ok(None)` when no function matches the selector.
    pub fn decode_calldata(&self, calldata: &[u8]) -> Result<Option<DecodedCall>> {
        let Some(selector) = calldata.get(..SELECTOR_SIZE) else {
            return Ok(None);
        };
        let mut key = [0u8; SELECTOR_SIZE];
        key.copy_from_slice(selector);

        self.method_by_selector(key)
            .map(|method| method.decode_call(calldata))
            .transpose()
    }
}
