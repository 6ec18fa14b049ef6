//! Functions, events and custom errors of a contract description

use std::fmt;

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

use crate::codec::{encode, Decoder};
use crate::core::{FieldDescription, TupleField, Type, Value};
use crate::{Error, Result};

/// Length of a function or error selector
pub const SELECTOR_SIZE: usize = 4;

/// Declared state mutability of a function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "pure" => Some(Self::Pure),
            "view" | "constant" => Some(Self::View),
            "nonpayable" => Some(Self::NonPayable),
            "payable" => Some(Self::Payable),
            _ => None,
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pure => "pure",
            Self::View => "view",
            Self::NonPayable => "nonpayable",
            Self::Payable => "payable",
        })
    }
}

/// Build the argument tuple from a list of field descriptions
pub(crate) fn tuple_from_fields(fields: &[FieldDescription]) -> Result<Type> {
    let fields = fields
        .iter()
        .map(|field| {
            Ok(TupleField::new(field.name.clone(), Type::from_description(field)?)
                .indexed(field.indexed))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Type::tuple(fields))
}

/// Strip and verify a 4-byte selector
fn strip_selector<'a>(expected: [u8; SELECTOR_SIZE], data: &'a [u8]) -> Result<&'a [u8]> {
    if data.len() < SELECTOR_SIZE {
        return Err(Error::truncated(SELECTOR_SIZE, data.len()));
    }
    let (selector, rest) = data.split_at(SELECTOR_SIZE);
    if selector != expected {
        return Err(Error::validation(format!(
            "selector mismatch: got 0x{}, expected 0x{}",
            hex::encode(selector),
            hex::encode(expected)
        )));
    }
    Ok(rest)
}

/// Decode an argument tuple; an empty tuple needs no payload
fn decode_args(decoder: &Decoder, args: &Type, data: &[u8]) -> Result<Value> {
    if args.fields().is_empty() {
        return Ok(Value::tuple(Vec::<(String, Value)>::new()));
    }
    decoder.decode(args, data)
}

fn selector_of(signature: &str) -> [u8; SELECTOR_SIZE] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// A contract function (or constructor) with its argument and return tuples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub inputs: Type,
    pub outputs: Type,
    pub state_mutability: StateMutability,
}

impl Method {
    pub fn new(name: impl Into<String>, inputs: Type, outputs: Type) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: StateMutability::default(),
        }
    }

    /// Parse a declaration like `function balanceOf(address owner) view returns (uint256)`
    ///
    /// The leading `function` keyword is optional.
    pub fn parse(declaration: &str) -> Result<Self> {
        let trimmed = declaration.trim();
        let body = trimmed.strip_prefix("function ").unwrap_or(trimmed);
        super::human::parse_method(body, declaration)
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.inputs.signature())
    }

    /// First 4 bytes of the keccak-256 hash of the signature
    pub fn selector(&self) -> [u8; SELECTOR_SIZE] {
        selector_of(&self.signature())
    }

    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }

    /// Selector followed by the encoded arguments
    pub fn encode_call(&self, args: &Value) -> Result<Vec<u8>> {
        let mut calldata = self.selector().to_vec();
        calldata.extend(encode(&self.inputs, args)?);
        Ok(calldata)
    }

    /// Arguments only, without a selector (constructor arguments, for instance)
    pub fn encode_args(&self, args: &Value) -> Result<Vec<u8>> {
        encode(&self.inputs, args)
    }

    /// Verify the selector and decode the arguments of `calldata`
    pub fn decode_input(&self, calldata: &[u8]) -> Result<Value> {
        self.decode_input_with(&Decoder::default(), calldata)
    }

    pub fn decode_input_with(&self, decoder: &Decoder, calldata: &[u8]) -> Result<Value> {
        let data = strip_selector(self.selector(), calldata)?;
        decode_args(decoder, &self.inputs, data)
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> Result<Value> {
        decode_args(&Decoder::default(), &self.outputs, data)
    }
}

/// A contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    /// All arguments, indexed ones marked on their tuple fields
    pub inputs: Type,
    pub anonymous: bool,
}

impl Event {
    pub fn new(name: impl Into<String>, inputs: Type) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous: false,
        }
    }

    /// Parse a declaration like `event Transfer(address indexed from, address indexed to, uint256 value)`
    pub fn parse(declaration: &str) -> Result<Self> {
        let trimmed = declaration.trim();
        let body = trimmed.strip_prefix("event ").unwrap_or(trimmed);
        super::human::parse_event(body, declaration)
    }

    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.inputs.signature())
    }

    /// Full keccak-256 hash of the signature, the event's first log topic
    pub fn topic(&self) -> B256 {
        keccak256(self.signature().as_bytes())
    }

    /// Non-indexed arguments, the part carried in the log's data
    pub fn data_type(&self) -> Type {
        Type::tuple(
            self.inputs
                .fields()
                .iter()
                .filter(|field| !field.indexed)
                .cloned()
                .collect(),
        )
    }
}

/// A custom error declared by the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDef {
    pub name: String,
    pub inputs: Type,
}

impl ErrorDef {
    pub fn new(name: impl Into<String>, inputs: Type) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.inputs.signature())
    }

    pub fn selector(&self) -> [u8; SELECTOR_SIZE] {
        selector_of(&self.signature())
    }

    /// Verify the selector and decode the error arguments from revert data
    pub fn decode(&self, revert_data: &[u8]) -> Result<Value> {
        let data = strip_selector(self.selector(), revert_data)?;
        decode_args(&Decoder::default(), &self.inputs, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        let transfer = Method::parse("transfer(address to, uint256 amount)").unwrap();
        assert_eq!(transfer.signature(), "transfer(address,uint256)");
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);

        let approve = Method::parse("function approve(address,uint256) returns (bool)").unwrap();
        assert_eq!(approve.selector_hex(), "0x095ea7b3");
    }

    #[test]
    fn test_event_topic() {
        let event =
            Event::parse("event Transfer(address indexed from, address indexed to, uint256 value)")
                .unwrap();
        assert_eq!(event.signature(), "Transfer(address,address,uint256)");
        assert_eq!(
            hex::encode(event.topic()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(event.data_type().format(true), "tuple(uint256 value)");
    }

    #[test]
    fn test_selector_mismatch() {
        let method = Method::parse("transfer(address,uint256)").unwrap();
        let err = method.decode_input(&hex::decode("deadbeef").unwrap()).unwrap_err();
        assert!(err.to_string().contains("selector mismatch"));

        let err = method.decode_input(&[0xa9, 0x05]).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
    }

    #[test]
    fn test_decode_transfer_input() {
        let method = Method::parse("transfer(address to, uint256 amount)").unwrap();
        let calldata = hex::decode(
            "a9059cbb000000000000000000000000123456789012345678901234567890123456789000000000000000000000000000000000000000000000000000000000000003e8",
        )
        .unwrap();

        let args = method.decode_input(&calldata).unwrap();
        assert_eq!(args.get("amount"), Some(&Value::from(1000u32)));
        let to = args.get("to").and_then(Value::as_address).unwrap();
        assert_eq!(
            hex::encode(to),
            "1234567890123456789012345678901234567890"
        );
    }

    #[test]
    fn test_no_arguments() {
        let method = Method::parse("function totalSupply() view returns (uint256)").unwrap();
        assert_eq!(method.state_mutability, StateMutability::View);
        let calldata = method.encode_call(&Value::Array(vec![])).unwrap();
        assert_eq!(calldata, hex::decode("18160ddd").unwrap());
        assert_eq!(
            method.decode_input(&calldata).unwrap(),
            Value::tuple(Vec::<(String, Value)>::new())
        );
    }

    #[test]
    fn test_error_decode() {
        let error = ErrorDef::new("Error", Type::parse("tuple(string reason)").unwrap());
        assert_eq!(hex::encode(error.selector()), "08c379a0");

        let mut data = error.selector().to_vec();
        data.extend(encode(&error.inputs, &Value::Array(vec![Value::from("nope")])).unwrap());
        assert_eq!(error.decode(&data).unwrap().get("reason"), Some(&Value::from("nope")));
    }
}
