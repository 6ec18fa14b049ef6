//! ABI type tree
//!
//! A [`Type`] is built once (from a signature string or a structured field
//! description) and never mutated afterwards. Types are `Send + Sync` and may
//! be shared across any number of concurrent encode/decode calls.

mod description;
mod parser;

use std::fmt;
use std::sync::OnceLock;

pub use description::FieldDescription;
pub use parser::MAX_DEPTH;

/// Largest integer width in bits
pub const MAX_INT_BITS: usize = 256;

/// Encoded size of an address in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Encoded size of a function reference (address + selector) in bytes
pub const FUNCTION_SIZE: usize = 24;

/// The kind of an ABI type, without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    Int,
    UInt,
    String,
    Bytes,
    FixedBytes,
    Address,
    Function,
    /// Dynamic-length sequence (`T[]`)
    Slice,
    /// Fixed-length sequence (`T[N]`)
    Array,
    /// Ordered record (`tuple(...)`)
    Tuple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shape {
    Bool,
    Int(usize),
    UInt(usize),
    String,
    Bytes,
    FixedBytes(usize),
    Address,
    Function,
    Slice(Box<Type>),
    Array(Box<Type>, usize),
    Tuple(Vec<TupleField>),
}

/// An immutable ABI type node
#[derive(Debug, Clone)]
pub struct Type {
    pub(crate) shape: Shape,
    /// Compiler-provided label such as `struct Pool.Key`
    pub(crate) internal_type: Option<String>,
    /// Written as bare `int`/`uint` in the source signature
    pub(crate) bare: bool,
    pub(crate) static_words: OnceLock<Option<usize>>,
}

/// A named entry of a tuple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    /// Field name (may be empty)
    pub name: String,
    /// Field type
    pub ty: Type,
    /// Event argument marker, ignored by the codec
    pub indexed: bool,
}

impl TupleField {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Key under which this field appears in a decoded tuple
    ///
    /// Unnamed fields resolve to their zero-based position.
    pub fn key(&self, position: usize) -> String {
        if self.name.is_empty() {
            position.to_string()
        } else {
            self.name.clone()
        }
    }

    pub fn internal_type(&self) -> Option<&str> {
        self.ty.internal_type()
    }
}

/// Structural equality: `internal_type` labels and bare `int`/`uint` spellings are ignored
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl Eq for Type {}

impl Type {
    pub(crate) fn from_shape(shape: Shape) -> Self {
        Self {
            shape,
            internal_type: None,
            bare: false,
            static_words: OnceLock::new(),
        }
    }

    /// Parse a type signature such as `uint256[]` or `tuple(address to, uint256 amount)`
    pub fn parse(signature: &str) -> crate::Result<Self> {
        parser::parse(signature)
    }

    /// Build a type from a structured field description
    pub fn from_description(field: &FieldDescription) -> crate::Result<Self> {
        parser::from_description(field)
    }

    pub fn bool() -> Self {
        Self::from_shape(Shape::Bool)
    }

    pub fn address() -> Self {
        Self::from_shape(Shape::Address)
    }

    pub fn string() -> Self {
        Self::from_shape(Shape::String)
    }

    pub fn bytes() -> Self {
        Self::from_shape(Shape::Bytes)
    }

    pub fn function() -> Self {
        Self::from_shape(Shape::Function)
    }

    /// Signed integer of `bits` width (8..=256, multiple of 8)
    pub fn int(bits: usize) -> crate::Result<Self> {
        check_int_bits("int", bits)?;
        Ok(Self::from_shape(Shape::Int(bits)))
    }

    /// Unsigned integer of `bits` width (8..=256, multiple of 8)
    pub fn uint(bits: usize) -> crate::Result<Self> {
        check_int_bits("uint", bits)?;
        Ok(Self::from_shape(Shape::UInt(bits)))
    }

    /// Fixed byte string of `size` bytes (1..=32)
    pub fn fixed_bytes(size: usize) -> crate::Result<Self> {
        if !(1..=32).contains(&size) {
            return Err(crate::Error::parse(
                &format!("bytes{}", size),
                "fixed bytes size must be between 1 and 32",
            ));
        }
        Ok(Self::from_shape(Shape::FixedBytes(size)))
    }

    /// Dynamic-length sequence of `elem`
    pub fn slice(elem: Type) -> Self {
        Self::from_shape(Shape::Slice(Box::new(elem)))
    }

    /// Fixed-length sequence of `len` elements
    pub fn array(elem: Type, len: usize) -> Self {
        Self::from_shape(Shape::Array(Box::new(elem), len))
    }

    pub fn tuple(fields: Vec<TupleField>) -> Self {
        Self::from_shape(Shape::Tuple(fields))
    }

    /// Attach a compiler-provided internal type label
    pub fn with_internal_type(mut self, label: impl Into<String>) -> Self {
        self.internal_type = Some(label.into());
        self
    }

    pub fn kind(&self) -> TypeKind {
        match &self.shape {
            Shape::Bool => TypeKind::Bool,
            Shape::Int(_) => TypeKind::Int,
            Shape::UInt(_) => TypeKind::UInt,
            Shape::String => TypeKind::String,
            Shape::Bytes => TypeKind::Bytes,
            Shape::FixedBytes(_) => TypeKind::FixedBytes,
            Shape::Address => TypeKind::Address,
            Shape::Function => TypeKind::Function,
            Shape::Slice(_) => TypeKind::Slice,
            Shape::Array(..) => TypeKind::Array,
            Shape::Tuple(_) => TypeKind::Tuple,
        }
    }

    /// Bit width for integer types
    pub fn bits(&self) -> Option<usize> {
        match self.shape {
            Shape::Int(bits) | Shape::UInt(bits) => Some(bits),
            _ => None,
        }
    }

    /// Payload size in bytes for fixed-size byte-like types
    pub fn byte_size(&self) -> Option<usize> {
        match self.shape {
            Shape::FixedBytes(size) => Some(size),
            Shape::Address => Some(ADDRESS_SIZE),
            Shape::Function => Some(FUNCTION_SIZE),
            Shape::Int(bits) | Shape::UInt(bits) => Some(bits / 8),
            _ => None,
        }
    }

    /// Element type for slices and arrays
    pub fn elem(&self) -> Option<&Type> {
        match &self.shape {
            Shape::Slice(elem) | Shape::Array(elem, _) => Some(elem),
            _ => None,
        }
    }

    /// Element count for fixed-length arrays
    pub fn len(&self) -> Option<usize> {
        match self.shape {
            Shape::Array(_, len) => Some(len),
            _ => None,
        }
    }

    /// Fields of a tuple type (empty for every other kind)
    pub fn fields(&self) -> &[TupleField] {
        match &self.shape {
            Shape::Tuple(fields) => fields,
            _ => &[],
        }
    }

    pub fn internal_type(&self) -> Option<&str> {
        self.internal_type.as_deref()
    }

    /// True for String, Bytes, Slice and any container holding one of them
    pub fn is_dynamic(&self) -> bool {
        match &self.shape {
            Shape::String | Shape::Bytes | Shape::Slice(_) => true,
            Shape::Array(elem, _) => elem.is_dynamic(),
            Shape::Tuple(fields) => fields.iter().any(|field| field.ty.is_dynamic()),
            _ => false,
        }
    }

    /// True for types whose encoding starts with a count word
    pub fn is_length_prefixed(&self) -> bool {
        matches!(self.shape, Shape::String | Shape::Bytes | Shape::Slice(_))
    }

    /// Render the type as a signature string
    ///
    /// Canonical mode expands `int`/`uint` to their 256-bit names and renders
    /// every tuple with the `tuple` keyword. Field names and `indexed` markers
    /// are kept in both modes, so the output parses back to an equal type.
    pub fn format(&self, canonical: bool) -> String {
        let mut out = String::new();
        self.write_format(&mut out, canonical);
        out
    }

    fn write_format(&self, out: &mut String, canonical: bool) {
        match &self.shape {
            Shape::Tuple(fields) => {
                if canonical {
                    out.push_str("tuple");
                }
                out.push('(');
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    field.ty.write_format(out, canonical);
                    if field.indexed {
                        out.push_str(" indexed");
                    }
                    if !field.name.is_empty() {
                        out.push(' ');
                        out.push_str(&field.name);
                    }
                }
                out.push(')');
            }
            Shape::Slice(elem) => {
                elem.write_format(out, canonical);
                out.push_str("[]");
            }
            Shape::Array(elem, len) => {
                elem.write_format(out, canonical);
                out.push_str(&format!("[{}]", len));
            }
            Shape::Int(_) if self.bare && !canonical => out.push_str("int"),
            Shape::UInt(_) if self.bare && !canonical => out.push_str("uint"),
            _ => self.write_scalar(out),
        }
    }

    fn write_scalar(&self, out: &mut String) {
        match &self.shape {
            Shape::Bool => out.push_str("bool"),
            Shape::Int(bits) => out.push_str(&format!("int{}", bits)),
            Shape::UInt(bits) => out.push_str(&format!("uint{}", bits)),
            Shape::String => out.push_str("string"),
            Shape::Bytes => out.push_str("bytes"),
            Shape::FixedBytes(size) => out.push_str(&format!("bytes{}", size)),
            Shape::Address => out.push_str("address"),
            Shape::Function => out.push_str("function"),
            Shape::Slice(_) | Shape::Array(..) | Shape::Tuple(_) => {}
        }
    }

    /// Selector form: tuples as `(t1,t2)` without names, keywords or markers
    ///
    /// This is the string hashed to derive function selectors and event topics.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        match &self.shape {
            Shape::Tuple(fields) => {
                out.push('(');
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    field.ty.write_signature(out);
                }
                out.push(')');
            }
            Shape::Slice(elem) => {
                elem.write_signature(out);
                out.push_str("[]");
            }
            Shape::Array(elem, len) => {
                elem.write_signature(out);
                out.push_str(&format!("[{}]", len));
            }
            _ => self.write_scalar(out),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(true))
    }
}

impl std::str::FromStr for Type {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

fn check_int_bits(prefix: &str, bits: usize) -> crate::Result<()> {
    if bits == 0 || bits > MAX_INT_BITS || bits % 8 != 0 {
        return Err(crate::Error::parse(
            &format!("{}{}", prefix, bits),
            "integer width must be a multiple of 8 between 8 and 256",
        ));
    }
    Ok(())
}
