//! Contract description - functions, events and errors indexed by name and selector

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value as Json;
use tracing::{debug, warn};

use super::human::{parse_declaration, Declaration};
use super::method::tuple_from_fields;
use super::{ErrorDef, Event, Method, StateMutability, SELECTOR_SIZE};
use crate::core::FieldDescription;
use crate::{Error, Result};

/// One entry of a JSON contract description
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<FieldDescription>,
    #[serde(default)]
    outputs: Vec<FieldDescription>,
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    anonymous: bool,
    // pre-0.5 compilers
    #[serde(default)]
    constant: bool,
    #[serde(default)]
    payable: bool,
}

impl Entry {
    fn state_mutability(&self) -> StateMutability {
        match self.state_mutability {
            Some(state) => state,
            None if self.constant => StateMutability::View,
            None if self.payable => StateMutability::Payable,
            None => StateMutability::NonPayable,
        }
    }
}

/// A parsed contract description
///
/// Functions keep declaration order; overloads share a name and are told apart
/// by selector. When two functions share a selector the first one wins.
#[derive(Debug, Default, Clone)]
pub struct Abi {
    pub constructor: Option<Method>,
    methods: Vec<Method>,
    events: Vec<Event>,
    errors: Vec<ErrorDef>,
    by_selector: HashMap<[u8; SELECTOR_SIZE], usize>,
}

impl Abi {
    /// Create a new empty description
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON description: either a bare entry array or an object with an `abi` field
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Json = serde_json::from_str(json)?;
        let entries = match root {
            Json::Array(entries) => entries,
            Json::Object(mut object) => match object.remove("abi") {
                Some(Json::Array(entries)) => entries,
                _ => return Err(Error::Description("expected an `abi` array".to_string())),
            },
            _ => return Err(Error::Description("expected an array of entries".to_string())),
        };

        let mut abi = Self::new();
        for (index, raw) in entries.into_iter().enumerate() {
            let entry: Entry = serde_json::from_value(raw)
                .map_err(|e| Error::Description(format!("entry {}: {}", index, e)))?;
            abi.add_entry(entry)
                .map_err(|e| Error::Description(format!("entry {}: {}", index, e)))?;
        }

        debug!(
            methods = abi.methods.len(),
            events = abi.events.len(),
            errors = abi.errors.len(),
            "loaded contract description"
        );
        Ok(abi)
    }

    /// Parse human-readable declarations, one per line
    ///
    /// Blank lines and `//` comments are skipped.
    pub fn from_human_readable<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut abi = Self::new();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            match parse_declaration(line)? {
                Declaration::Function(method) => abi.insert_method(method),
                Declaration::Constructor(method) => abi.constructor = Some(method),
                Declaration::Event(event) => abi.events.push(event),
                Declaration::Error(error) => abi.errors.push(error),
            }
        }
        Ok(abi)
    }

    fn add_entry(&mut self, entry: Entry) -> Result<()> {
        // a missing type means function
        let kind = entry.kind.clone().unwrap_or_else(|| "function".to_string());
        match kind.as_str() {
            "function" => {
                let mut method = Method::new(
                    entry.name.clone(),
                    tuple_from_fields(&entry.inputs)?,
                    tuple_from_fields(&entry.outputs)?,
                );
                method.state_mutability = entry.state_mutability();
                self.insert_method(method);
            }
            "constructor" => {
                let mut method = Method::new(
                    "constructor",
                    tuple_from_fields(&entry.inputs)?,
                    tuple_from_fields(&[])?,
                );
                method.state_mutability = entry.state_mutability();
                self.constructor = Some(method);
            }
            "event" => {
                let mut event = Event::new(entry.name.clone(), tuple_from_fields(&entry.inputs)?);
                event.anonymous = entry.anonymous;
                self.events.push(event);
            }
            "error" => {
                self.errors
                    .push(ErrorDef::new(entry.name.clone(), tuple_from_fields(&entry.inputs)?));
            }
            other => warn!(kind = other, name = %entry.name, "skipping unsupported entry"),
        }
        Ok(())
    }

    /// Insert a function
    ///
    /// Note: first function for a given selector wins the selector lookup
    pub fn insert_method(&mut self, method: Method) {
        let index = self.methods.len();
        self.by_selector.entry(method.selector()).or_insert(index);
        self.methods.push(method);
    }

    /// First function declared with `name`
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// All overloads declared with `name`
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Method> {
        self.methods.iter().filter(move |method| method.name == name)
    }

    /// Look up a function by selector
    pub fn method_by_selector(&self, selector: [u8; SELECTOR_SIZE]) -> Option<&Method> {
        self.by_selector.get(&selector).map(|index| &self.methods[*index])
    }

    /// Look up a function by selector hex string (e.g., "0xa9059cbb")
    pub fn method_by_selector_hex(&self, selector_hex: &str) -> Option<&Method> {
        let normalized = selector_hex
            .strip_prefix("0x")
            .or_else(|| selector_hex.strip_prefix("0X"))
            .unwrap_or(selector_hex);

        if normalized.len() != SELECTOR_SIZE * 2 {
            return None;
        }

        let bytes = hex::decode(normalized).ok()?;
        let selector: [u8; SELECTOR_SIZE] = bytes.try_into().ok()?;
        self.method_by_selector(selector)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.name == name)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Look up a custom error by the selector at the start of revert data
    pub fn error_by_selector(&self, selector: [u8; SELECTOR_SIZE]) -> Option<&ErrorDef> {
        self.errors.iter().find(|error| error.selector() == selector)
    }

    pub fn errors(&self) -> &[ErrorDef] {
        &self.errors
    }

    /// Check if the description declares nothing
    pub fn is_empty(&self) -> bool {
        self.constructor.is_none()
            && self.methods.is_empty()
            && self.events.is_empty()
            && self.errors.is_empty()
    }

    /// Merge another description into this one
    ///
    /// Functions from the other description only claim selectors that are not
    /// already present (first wins). A constructor is kept if already set.
    pub fn merge(&mut self, other: Self) {
        for method in other.methods {
            self.insert_method(method);
        }
        self.events.extend(other.events);
        self.errors.extend(other.errors);
        if self.constructor.is_none() {
            self.constructor = other.constructor;
        }
    }
}
